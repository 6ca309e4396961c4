//! [`Args`] definitions.

use clap::Parser;

use crate::config;

/// Mock user search API of the user directory.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Host to bind the server to, overriding the configured one.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind the server to, overriding the configured one.
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }

    /// Applies the overrides of these [`Args`] to the provided
    /// [`config::Server`].
    pub fn apply(&self, server: &mut config::Server) {
        if let Some(host) = &self.host {
            server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            server.port = port;
        }
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use crate::config;

    use super::Args;

    #[test]
    fn overrides_server() {
        let args =
            Args::try_parse_from(["application", "--port", "9000"]).unwrap();
        let mut server = config::Server::default();

        args.apply(&mut server);

        assert_eq!(args.config, "config.toml");
        assert_eq!(server.port, 9000);
        assert_eq!(server.host, "0.0.0.0");
    }
}
