//! Process configuration.
//!
//! Every option can be given as a flag or through the environment. [`Cli`] is
//! validated once into an immutable [`AppConfig`] at startup.

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, ValueEnum};
use url::Url;
use x402_kit::{
    facilitator_client::{FacilitatorClient, FacilitatorClientError},
    networks::evm::{AddressError, EvmAddress, KnownNetwork, UnknownNetwork},
    price::{Price, PriceError},
};

/// Path of the paid endpoint.
pub const RANDOM_PATH: &str = "/api/random";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FacilitatorPreset {
    /// https://x402.org/facilitator (testnets, no credentials)
    #[default]
    X402Org,
    /// https://facilitator.payai.network
    Payai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "x402-random")]
#[command(about = "A random number service that charges per call with x402")]
pub struct Cli {
    /// Address that receives payments.
    #[arg(
        long,
        env = "X402_WALLET_ADDRESS",
        default_value = "0x0000000000000000000000000000000000000000"
    )]
    pub wallet_address: String,

    /// Network to accept payments on (base or base-sepolia).
    #[arg(long, env = "X402_NETWORK", default_value = "base-sepolia")]
    pub network: String,

    /// Price per call in dollars.
    #[arg(long, env = "X402_PRICE", default_value = "$0.01")]
    pub price: String,

    /// Upper bound for verifying and settling one payment.
    #[arg(long, env = "X402_MAX_TIMEOUT_SECONDS", default_value_t = 60)]
    pub max_timeout_seconds: u64,

    #[arg(long, env = "X402_FACILITATOR", value_enum, default_value_t = FacilitatorPreset::X402Org)]
    pub facilitator: FacilitatorPreset,

    /// Facilitator base URL; overrides the preset.
    #[arg(long, env = "FACILITATOR_URL")]
    pub facilitator_url: Option<String>,

    /// Bearer token sent to the facilitator.
    #[arg(long, env = "FACILITATOR_API_KEY", hide_env_values = true)]
    pub facilitator_api_key: Option<String>,

    /// Public base URL of this service, used in payment requirements.
    #[arg(long, env = "PUBLIC_URL", default_value = "http://localhost:3000")]
    pub public_url: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid wallet address '{address}': {source}")]
    InvalidWalletAddress {
        address: String,
        source: AddressError,
    },
    #[error(transparent)]
    InvalidNetwork(#[from] UnknownNetwork),
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),
    #[error("price must be greater than zero")]
    ZeroPrice,
    #[error("max timeout must be at least one second")]
    ZeroTimeout,
    #[error("invalid {name} '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("facilitator client: {0}")]
    Facilitator(#[from] FacilitatorClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilitatorConfig {
    pub preset: FacilitatorPreset,
    pub url: Option<Url>,
    pub api_key: Option<String>,
}

impl FacilitatorConfig {
    /// Build the HTTP client for this configuration.
    pub fn client(&self) -> Result<FacilitatorClient, ConfigError> {
        let client = match (&self.url, self.preset) {
            (Some(url), _) => FacilitatorClient::from_url(url.clone()),
            (None, FacilitatorPreset::X402Org) => FacilitatorClient::x402_org()?,
            (None, FacilitatorPreset::Payai) => FacilitatorClient::payai()?,
        };

        match &self.api_key {
            Some(api_key) => Ok(client.with_bearer_token(api_key)?),
            None => Ok(client),
        }
    }
}

/// Validated, immutable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub pay_to: EvmAddress,
    pub network: KnownNetwork,
    pub price: Price,
    pub max_timeout_seconds: u64,
    pub facilitator: FacilitatorConfig,
    /// Full URL of the paid endpoint.
    pub resource_url: Url,
    pub listen_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let pay_to = cli.wallet_address.parse::<EvmAddress>().map_err(|source| {
            ConfigError::InvalidWalletAddress {
                address: cli.wallet_address.clone(),
                source,
            }
        })?;

        let network: KnownNetwork = cli.network.parse()?;

        let price: Price = cli.price.parse()?;
        if price.is_zero() {
            return Err(ConfigError::ZeroPrice);
        }
        price.to_atomic_units(network.usdc().decimals)?;

        if cli.max_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let facilitator_url = cli
            .facilitator_url
            .as_deref()
            .map(|value| parse_url("FACILITATOR_URL", value))
            .transpose()?;

        let resource_url = parse_url("PUBLIC_URL", &cli.public_url)?
            .join(RANDOM_PATH)
            .map_err(|source| ConfigError::InvalidUrl {
                name: "PUBLIC_URL",
                value: cli.public_url.clone(),
                source,
            })?;

        Ok(AppConfig {
            pay_to,
            network,
            price,
            max_timeout_seconds: cli.max_timeout_seconds,
            facilitator: FacilitatorConfig {
                preset: cli.facilitator,
                url: facilitator_url,
                api_key: cli.facilitator_api_key.filter(|key| !key.is_empty()),
            },
            resource_url,
            listen_addr: SocketAddr::new(cli.host, cli.port),
            log_format: cli.log_format,
        })
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}
