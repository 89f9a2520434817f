use std::{
    collections::{HashMap, HashSet},
    env, fs,
    ops::Deref,
    path::Path,
    str::FromStr,
    sync::Arc,
};

use crate::{
    error::Error,
    helpers::{parse_tuple_string, tx_selector, Store_Backend},
    provider::{DatabasePool, Ledger},
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub ledger: Box<dyn Ledger>,
}

impl State {
    pub fn new(
        config: Config,
        database: DatabasePool,
        ledger: Box<dyn Ledger>,
    ) -> State {
        Self {
            config,
            database,
            ledger,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: Store_Backend,
    pub database_url: String,
    pub max_connections: u32,
    pub rpc_url: String,
    pub timeout: u64,
    pub events_source: String,
    pub excluded_accounts: HashSet<String>,
    pub issue_selectors: HashMap<String, String>,
    pub burn_selectors: HashMap<String, String>,
    pub stable_currencies: Vec<String>,
    pub price_currency: String,
    pub debt_currency: String,
    pub state_contract_name: String,
}

impl Config {
    /// System accounts (escrow contracts) never get holder or debt snapshots.
    pub fn is_excluded(&self, account: &str) -> bool {
        self.excluded_accounts.contains(&account.to_lowercase())
    }

    pub fn classify_issue(&self, tx_input: &str) -> Option<&str> {
        classify(&self.issue_selectors, tx_input)
    }

    pub fn classify_burn(&self, tx_input: &str) -> Option<&str> {
        classify(&self.burn_selectors, tx_input)
    }
}

fn classify<'a>(
    selectors: &'a HashMap<String, String>,
    tx_input: &str,
) -> Option<&'a str> {
    let selector = tx_selector(tx_input)?;
    selectors.get(&selector).map(|name| name.as_str())
}

pub fn get_configuration() -> Result<Config, Error> {
    let store_backend = Store_Backend::from_str(&env::var("STORE_BACKEND")?)?;
    let database_url = match store_backend {
        Store_Backend::Postgres => env::var("DATABASE_URL")?,
        Store_Backend::Memory => env::var("DATABASE_URL").unwrap_or_default(),
    };
    let max_connections = env::var("MAX_CONNECTIONS")?.parse()?;
    let rpc_url = env::var("RPC_URL")?;
    let timeout = env::var("TIMEOUT")?.parse()?;
    let events_source = env::var("EVENTS_SOURCE")?;

    let excluded_accounts = env::var("EXCLUDED_ACCOUNTS")?
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect::<HashSet<String>>();

    let issue_selectors = parse_selectors(env::var("ISSUE_SELECTORS")?)?;
    let burn_selectors = parse_selectors(env::var("BURN_SELECTORS")?)?;

    let stable_currencies = env::var("STABLE_CURRENCIES")?
        .split(',')
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect::<Vec<String>>();

    let price_currency = env::var("PRICE_CURRENCY")?;
    let debt_currency = env::var("DEBT_CURRENCY")?;
    let state_contract_name = env::var("STATE_CONTRACT_NAME")?;

    let config = Config {
        store_backend,
        database_url,
        max_connections,
        rpc_url,
        timeout,
        events_source,
        excluded_accounts,
        issue_selectors,
        burn_selectors,
        stable_currencies,
        price_currency,
        debt_currency,
        state_contract_name,
    };

    Ok(config)
}

pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";
    let etl_config_file: &str = "etl.conf";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);
    let etl_config_path = format!("{}/{}", directory, etl_config_file);

    let etl_config_string = fs::read_to_string(etl_config_path)?;
    parse_config_string(etl_config_string)?;

    // local overrides are optional
    if Path::new(&path).exists() {
        let config_string = fs::read_to_string(path)?;
        parse_config_string(config_string)?;
    }

    Ok(())
}

fn parse_config_string(config: String) -> Result<(), Error> {
    let params: Vec<Option<(&str, &str)>> = config
        .split('\n')
        .filter(|s| !s.trim_start().starts_with('#'))
        .map(|s| {
            let element = s.find('=');
            if let Some(e) = element {
                return Some(s.split_at(e));
            }
            None
        })
        .map(|value| {
            if let Some((k, v)) = value {
                return Some((k.trim(), v[1..].trim()));
            }
            None
        })
        .collect();

    for (key, value) in params.into_iter().flatten() {
        env::set_var(key, value);
    }

    Ok(())
}

/// Parses `(0xaf086c7e,issueMaxSynths),(...)` into a selector -> name map.
pub fn parse_selectors(data: String) -> Result<HashMap<String, String>, Error> {
    let mut selectors = HashMap::new();

    for item in parse_tuple_string(data) {
        let (selector, name) = item.split_once(',').ok_or_else(|| {
            Error::ConfigurationError(format!("invalid selector entry {}", item))
        })?;
        selectors.insert(selector.trim().to_lowercase(), name.trim().to_owned());
    }

    Ok(selectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selectors() {
        let selectors = parse_selectors(String::from(
            "(0xAF086C7E,issueMaxSynths),(0x320223db, issueMaxSynthsOnBehalf)",
        ))
        .unwrap();

        assert_eq!(selectors.len(), 2);
        assert_eq!(
            selectors.get("0xaf086c7e").map(String::as_str),
            Some("issueMaxSynths")
        );
        assert_eq!(
            selectors.get("0x320223db").map(String::as_str),
            Some("issueMaxSynthsOnBehalf")
        );
    }

    #[test]
    fn test_parse_selectors_rejects_missing_name() {
        let result = parse_selectors(String::from("(0xaf086c7e)"));
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_classify_by_tx_input() {
        let selectors = parse_selectors(String::from(
            "(0x295da87d,burnSynths),(0x9741fb22,burnSynthsToTarget)",
        ))
        .unwrap();

        assert_eq!(
            classify(&selectors, "0x295da87d0000000000000000000000000000000000000000000000000000000000000001"),
            Some("burnSynths")
        );
        assert_eq!(classify(&selectors, "0xdeadbeef"), None);
        assert_eq!(classify(&selectors, "0x"), None);
    }
}
