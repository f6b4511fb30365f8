use jess_config::Config;

/// Strategy for writing the default `jess` config to `~/.jess/config.json`.
///
/// Refuses to overwrite an existing file.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        Config::create_config()
    }
}
