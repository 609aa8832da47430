//! Gallery image command handlers.

use tabled::Tabled;

use campus_core::{Command as CoreCommand, CommandResult, Console, GalleryImage};

use crate::cli::{GlobalOpts, ImagesArgs, ImagesCommand};
use crate::error::CliError;
use crate::output;

use super::{unexpected, util};

#[derive(Tabled)]
struct ImageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&GalleryImage> for ImageRow {
    fn from(i: &GalleryImage) -> Self {
        Self {
            id: i.id.clone(),
            name: i.name.clone(),
            url: i.url.clone(),
        }
    }
}

pub async fn handle(
    console: &Console,
    args: ImagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ImagesCommand::List { search } => {
            let images = console.images(search.as_deref()).await?;
            let out = output::render_list(
                &global.output,
                &images,
                |i| ImageRow::from(i),
                |i| i.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ImagesCommand::Add { name, file, url } => {
            let cmd = match (file, url) {
                (Some(path), _) => {
                    let (file_name, bytes) = util::read_upload(&path, "file")?;
                    CoreCommand::UploadImage {
                        name,
                        file_name,
                        bytes,
                    }
                }
                (None, Some(url)) => {
                    url::Url::parse(&url).map_err(|e| CliError::Validation {
                        field: "url".into(),
                        reason: format!("invalid URL '{url}': {e}"),
                    })?;
                    CoreCommand::AddImageUrl { name, url }
                }
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "source".into(),
                        reason: "pass --file or --url".into(),
                    });
                }
            };

            match console.execute(cmd).await? {
                CommandResult::Uploaded { url, .. } => {
                    if !global.quiet {
                        eprintln!("Image uploaded");
                    }
                    output::print_output(&url, global.quiet);
                    Ok(())
                }
                CommandResult::Created { .. } => {
                    if !global.quiet {
                        eprintln!("Image added");
                    }
                    Ok(())
                }
                other => Err(unexpected(&other)),
            }
        }

        ImagesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete image {id}?"), global.yes)? {
                return Ok(());
            }
            console
                .execute(CoreCommand::DeleteImage { id: id.clone() })
                .await?;
            if !global.quiet {
                eprintln!("Image {id} deleted");
            }
            Ok(())
        }
    }
}
