use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use lektor::player::canonical_embed_url;

use super::{mux_job, HttpOptions, MuxOptions};

/// Mux the best renditions of one player embed into `output<index>.mp4`
#[derive(Parser, Clone, Debug)]
#[clap(name = "video")]
pub struct VideoCommand {
    #[clap(flatten)]
    pub http: HttpOptions,

    #[clap(flatten)]
    pub mux: MuxOptions,

    /// Output directory
    #[clap(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Job index, used in the names of the produced files
    #[clap(short, long, default_value = "0")]
    pub index: usize,

    /// Player embed URL
    pub url: String,
}

impl VideoCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.http.into_client()?;
        let job = mux_job(&client, &self.http, &self.mux)?;

        let embed_url = canonical_embed_url(&self.url).unwrap_or(self.url);
        tokio::fs::create_dir_all(&self.output).await?;
        let output = job
            .run(&embed_url, &self.output, self.index)
            .await
            .with_context(|| format!("{}#{} {embed_url}", self.output.display(), self.index))?;

        println!("{}", output.display());
        Ok(())
    }
}
