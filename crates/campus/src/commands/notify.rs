//! Notification command handlers.

use tabled::Tabled;

use campus_core::{
    Attachment, ClassSection, Command as CoreCommand, CommandResult, Console, NewNotification,
    Notification,
};

use crate::cli::{GlobalOpts, NotifyArgs, NotifyCommand};
use crate::error::CliError;
use crate::output;

use super::{unexpected, util};

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Attachment")]
    attachment: String,
    #[tabled(rename = "Sent")]
    sent: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.clone(),
            to: n.receiver.clone(),
            from: n.sender.clone(),
            message: n.message.clone(),
            attachment: n.media_url.clone().unwrap_or_else(|| "-".into()),
            sent: n.created_at.map_or_else(
                || "-".into(),
                |t| t.format("%Y-%m-%d %H:%M").to_string(),
            ),
        }
    }
}

pub async fn handle(
    console: &Console,
    args: NotifyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NotifyCommand::Send {
            to,
            message,
            from,
            attach,
        } => {
            let receiver: ClassSection = to.parse()?;
            let mut notification = NewNotification::new(from, receiver, message)?;
            if let Some(path) = attach {
                let (file_name, bytes) = util::read_upload(&path, "attach")?;
                notification = notification.with_attachment(Attachment { file_name, bytes });
            }

            match console
                .execute(CoreCommand::SendNotification(notification))
                .await?
            {
                CommandResult::Created { .. } => {
                    if !global.quiet {
                        eprintln!("Notification sent to {receiver}");
                    }
                    Ok(())
                }
                CommandResult::Uploaded { url, .. } => {
                    if !global.quiet {
                        eprintln!("Notification sent to {receiver} with attachment {url}");
                    }
                    Ok(())
                }
                other => Err(unexpected(&other)),
            }
        }

        NotifyCommand::List { to } => {
            if let Some(ref raw) = to {
                raw.parse::<ClassSection>()?;
            }
            let notifications = console.notifications(to.as_deref()).await?;
            let out = output::render_list(
                &global.output,
                &notifications,
                |n| NotificationRow::from(n),
                |n| n.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NotifyCommand::Delete { id } => {
            if !util::confirm(&format!("Delete notification {id}?"), global.yes)? {
                return Ok(());
            }
            console
                .execute(CoreCommand::DeleteNotification { id: id.clone() })
                .await?;
            if !global.quiet {
                eprintln!("Notification {id} deleted");
            }
            Ok(())
        }
    }
}
