use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use super::{HttpOptions, SoundCloudOptions};

/// Download the track of a SoundCloud widget into `soundcloudaudio<index>.mp3`
#[derive(Parser, Clone, Debug)]
#[clap(name = "audio")]
pub struct AudioCommand {
    #[clap(flatten)]
    pub http: HttpOptions,

    #[clap(flatten)]
    pub soundcloud: SoundCloudOptions,

    /// Output directory
    #[clap(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Job index, used in the name of the produced file
    #[clap(short, long, default_value = "0")]
    pub index: usize,

    /// Widget iframe source
    pub src: String,
}

impl AudioCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.http.into_client()?;
        let Some(soundcloud) = self.soundcloud.into_client(client) else {
            bail!("--client-id is required to download SoundCloud tracks");
        };

        tokio::fs::create_dir_all(&self.output).await?;
        let output = soundcloud
            .download(&self.src, &self.output, self.index)
            .await
            .with_context(|| format!("{}#{} {}", self.output.display(), self.index, self.src))?;

        println!("{}", output.display());
        Ok(())
    }
}
