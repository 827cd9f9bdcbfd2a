use error_stack::{Report, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;

use super::ParseError;
use crate::util::{figment::FigmentErrorAttachable, Sensitive};

#[derive(Debug, Deserialize)]
pub struct Server {
    /// Address the HTTP server binds to.
    ///
    /// **Environment variables**: `RETIRADA_IP`
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    /// **Environment variables**: `RETIRADA_PORT`
    #[serde(default = "Server::default_port")]
    pub port: u16,
    /// Amount of actix worker threads to spawn.
    ///
    /// **Environment variables**: `RETIRADA_WORKERS`
    #[serde(default = "Server::default_workers")]
    pub workers: NonZeroUsize,
    /// Key used to sign and verify session tokens.
    ///
    /// **Environment variables**: `RETIRADA_JWT_SECRET`
    pub jwt_secret: Sensitive<String>,
    pub db: super::Database,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config.validate()?;

        Ok(config)
    }

    /// Sanity checks that figment/serde cannot express on their own.
    fn validate(&self) -> Result<(), ParseError> {
        if self.jwt_secret.len() < Self::JWT_SECRET_MIN {
            return Err(Report::new(ParseError).attach_printable(format!(
                "jwt_secret must be at least {} characters long",
                Self::JWT_SECRET_MIN
            )));
        }

        if let Some(replica) = self.db.replica.as_ref() {
            if !replica.readonly {
                return Err(Report::new(ParseError)
                    .attach_printable("db.replica.readonly must be left enabled"));
            }
        }

        Ok(())
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "retirada.toml";
    const JWT_SECRET_MIN: usize = 12;

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        3000
    }

    const fn default_workers() -> NonZeroUsize {
        match NonZeroUsize::new(1) {
            Some(n) => n,
            None => panic!("default workers is accidentally set to 0"),
        }
    }

    /// Creates a default [`figment::Figment`] object to load server
    /// configuration. This function is there for implementing
    /// [`Server::load`] and testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // One big con about figment (env provider to be specific) especially
            // these fields with underscore in it.
            .merge(Env::prefixed("RETIRADA_").map(|v| match v.as_str() {
                "DB_PRIMARY_READONLY" => "db.primary.readonly".into(),
                "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                "DB_REPLICA_READONLY" => "db.replica.readonly".into(),
                "DB_REPLICA_MIN_IDLE" => "db.replica.min_idle".into(),
                "DB_REPLICA_POOL_SIZE" => "db.replica.pool_size".into(),

                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                "JWT_SECRET" => "jwt_secret".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.primary.url".into(),
                _ => v.into(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::{NonZeroU32, NonZeroU64};

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "hello world!");

            jail.set_env("RETIRADA_JWT_SECRET", "extremely-secret-key");

            jail.set_env("RETIRADA_DB_PRIMARY_MIN_IDLE", "100");
            jail.set_env("RETIRADA_DB_PRIMARY_POOL_SIZE", "100");

            jail.set_env("RETIRADA_DB_REPLICA_URL", "required");
            jail.set_env("RETIRADA_DB_REPLICA_READONLY", "true");
            jail.set_env("RETIRADA_DB_REPLICA_MIN_IDLE", "589");
            jail.set_env("RETIRADA_DB_REPLICA_POOL_SIZE", "589");

            jail.set_env("RETIRADA_DB_ENFORCE_TLS", "false");
            jail.set_env("RETIRADA_DB_TIMEOUT_SECS", "3030");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.primary.url.as_str(), "hello world!");
            assert_eq!(
                config.db.primary.min_idle.unwrap(),
                NonZeroU32::new(100).unwrap()
            );
            assert_eq!(config.db.primary.pool_size, NonZeroU32::new(100).unwrap());

            let replica = config.db.replica.as_ref().unwrap();
            assert_eq!(replica.url.as_str(), "required");
            assert!(replica.readonly);
            assert_eq!(replica.min_idle.unwrap(), NonZeroU32::new(589).unwrap());
            assert_eq!(replica.pool_size, NonZeroU32::new(589).unwrap());

            assert!(!config.db.enforce_tls);
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(3030).unwrap());

            assert_eq!(*config.jwt_secret, "extremely-secret-key");

            Ok(())
        });
    }

    #[test]
    fn server_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/retirada");
            jail.set_env("RETIRADA_JWT_SECRET", "extremely-secret-key");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.ip, Server::default_ip());
            assert_eq!(config.port, 3000);
            assert_eq!(config.workers.get(), 1);
            assert!(config.db.replica.is_none());

            Ok(())
        });
    }

    #[test]
    fn validate_rejects_short_jwt_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/retirada");
            jail.set_env("RETIRADA_JWT_SECRET", "short");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());

            Ok(())
        });
    }
}
