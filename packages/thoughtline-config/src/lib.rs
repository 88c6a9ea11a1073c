mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, GenerationProviderConfig, Postgres, Providers, Retrieval,
	Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("generation", &cfg.providers.generation.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.retrieval.search_top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.search_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.chat_context_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.chat_context_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.chat_source_count == 0 {
		return Err(Error::Validation {
			message: "retrieval.chat_source_count must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.chat_source_count > cfg.retrieval.chat_context_k {
		return Err(Error::Validation {
			message: "retrieval.chat_source_count must not exceed retrieval.chat_context_k."
				.to_string(),
		});
	}
	if cfg.retrieval.thought_list_cap == 0 {
		return Err(Error::Validation {
			message: "retrieval.thought_list_cap must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
