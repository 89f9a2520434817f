use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::error::Error;

/// Outcome of a read-only contract call at a historical block.
///
/// A revert is an ordinary outcome; callers decide per field whether it is
/// optional or aborts the tracking step. Transport failures surface as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Read<T> {
    Value(T),
    Reverted,
}

impl<T> Read<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Read::Value(value) => Some(value),
            Read::Reverted => None,
        }
    }
}

/// The fixed set of view functions the handlers read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerCall {
    BalanceOf { contract: String, account: String },
    Collateral { contract: String, account: String },
    Transferable { contract: String, account: String },
    Resolver { contract: String },
    GetAddress { contract: String, name: String },
    IssuanceData { contract: String, account: String },
    DebtLedger { contract: String, index: String },
    DebtBalanceOf {
        contract: String,
        account: String,
        currency: String,
    },
    CurrencyKey { contract: String },
    DTrade { contract: String },
}

impl LedgerCall {
    pub fn contract(&self) -> &str {
        match self {
            LedgerCall::BalanceOf { contract, .. }
            | LedgerCall::Collateral { contract, .. }
            | LedgerCall::Transferable { contract, .. }
            | LedgerCall::Resolver { contract }
            | LedgerCall::GetAddress { contract, .. }
            | LedgerCall::IssuanceData { contract, .. }
            | LedgerCall::DebtLedger { contract, .. }
            | LedgerCall::DebtBalanceOf { contract, .. }
            | LedgerCall::CurrencyKey { contract }
            | LedgerCall::DTrade { contract } => contract,
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            LedgerCall::BalanceOf { .. } => "balanceOf(address)",
            LedgerCall::Collateral { .. } => "collateral(address)",
            LedgerCall::Transferable { .. } => "transferabledTrade(address)",
            LedgerCall::Resolver { .. } => "resolver()",
            LedgerCall::GetAddress { .. } => "getAddress(bytes32)",
            LedgerCall::IssuanceData { .. } => "issuanceData(address)",
            LedgerCall::DebtLedger { .. } => "debtLedger(uint256)",
            LedgerCall::DebtBalanceOf { .. } => "debtBalanceOf(address,bytes32)",
            LedgerCall::CurrencyKey { .. } => "currencyKey()",
            LedgerCall::DTrade { .. } => "dtrade()",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerValue {
    Uint(BigDecimal),
    Address(String),
    Bytes32(String),
    IssuanceData {
        initial_debt_ownership: BigDecimal,
        debt_entry_index: BigDecimal,
    },
}

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn call(
        &self,
        call: &LedgerCall,
        block: i64,
    ) -> Result<Read<LedgerValue>, Error>;
}

/// A contract address bound to the block of the event being handled.
pub struct Contract<'a> {
    ledger: &'a dyn Ledger,
    address: String,
    block: i64,
}

impl<'a> Contract<'a> {
    pub fn bind(ledger: &'a dyn Ledger, address: &str, block: i64) -> Self {
        Contract {
            ledger,
            address: address.to_lowercase(),
            block,
        }
    }

    pub async fn balance_of(
        &self,
        account: &str,
    ) -> Result<Read<BigDecimal>, Error> {
        self.read_uint(LedgerCall::BalanceOf {
            contract: self.address.to_owned(),
            account: account.to_lowercase(),
        })
        .await
    }

    pub async fn collateral(
        &self,
        account: &str,
    ) -> Result<Read<BigDecimal>, Error> {
        self.read_uint(LedgerCall::Collateral {
            contract: self.address.to_owned(),
            account: account.to_lowercase(),
        })
        .await
    }

    pub async fn transferable(
        &self,
        account: &str,
    ) -> Result<Read<BigDecimal>, Error> {
        self.read_uint(LedgerCall::Transferable {
            contract: self.address.to_owned(),
            account: account.to_lowercase(),
        })
        .await
    }

    pub async fn debt_ledger(
        &self,
        index: &BigDecimal,
    ) -> Result<Read<BigDecimal>, Error> {
        self.read_uint(LedgerCall::DebtLedger {
            contract: self.address.to_owned(),
            index: index.with_scale(0).to_string(),
        })
        .await
    }

    pub async fn debt_balance_of(
        &self,
        account: &str,
        currency: &str,
    ) -> Result<Read<BigDecimal>, Error> {
        self.read_uint(LedgerCall::DebtBalanceOf {
            contract: self.address.to_owned(),
            account: account.to_lowercase(),
            currency: currency.to_owned(),
        })
        .await
    }

    pub async fn resolver(&self) -> Result<Read<String>, Error> {
        self.read_address(LedgerCall::Resolver {
            contract: self.address.to_owned(),
        })
        .await
    }

    pub async fn get_address(&self, name: &str) -> Result<Read<String>, Error> {
        self.read_address(LedgerCall::GetAddress {
            contract: self.address.to_owned(),
            name: name.to_owned(),
        })
        .await
    }

    pub async fn dtrade(&self) -> Result<Read<String>, Error> {
        self.read_address(LedgerCall::DTrade {
            contract: self.address.to_owned(),
        })
        .await
    }

    pub async fn currency_key(&self) -> Result<Read<String>, Error> {
        let call = LedgerCall::CurrencyKey {
            contract: self.address.to_owned(),
        };
        match self.ledger.call(&call, self.block).await? {
            Read::Value(LedgerValue::Bytes32(key)) => Ok(Read::Value(key)),
            Read::Value(value) => Err(unexpected(&call, &value)),
            Read::Reverted => Ok(Read::Reverted),
        }
    }

    /// `(initialDebtOwnership, debtEntryIndex)`
    pub async fn issuance_data(
        &self,
        account: &str,
    ) -> Result<Read<(BigDecimal, BigDecimal)>, Error> {
        let call = LedgerCall::IssuanceData {
            contract: self.address.to_owned(),
            account: account.to_lowercase(),
        };
        match self.ledger.call(&call, self.block).await? {
            Read::Value(LedgerValue::IssuanceData {
                initial_debt_ownership,
                debt_entry_index,
            }) => Ok(Read::Value((initial_debt_ownership, debt_entry_index))),
            Read::Value(value) => Err(unexpected(&call, &value)),
            Read::Reverted => Ok(Read::Reverted),
        }
    }

    async fn read_uint(
        &self,
        call: LedgerCall,
    ) -> Result<Read<BigDecimal>, Error> {
        match self.ledger.call(&call, self.block).await? {
            Read::Value(LedgerValue::Uint(value)) => Ok(Read::Value(value)),
            Read::Value(value) => Err(unexpected(&call, &value)),
            Read::Reverted => Ok(Read::Reverted),
        }
    }

    async fn read_address(
        &self,
        call: LedgerCall,
    ) -> Result<Read<String>, Error> {
        match self.ledger.call(&call, self.block).await? {
            Read::Value(LedgerValue::Address(value)) => {
                Ok(Read::Value(value.to_lowercase()))
            },
            Read::Value(value) => Err(unexpected(&call, &value)),
            Read::Reverted => Ok(Read::Reverted),
        }
    }
}

fn unexpected(call: &LedgerCall, value: &LedgerValue) -> Error {
    Error::Ledger(format!(
        "{} on {} returned {:?}",
        call.signature(),
        call.contract(),
        value
    ))
}
