use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use blockmart_core::{Aggregate, AggregateRoot, AccountId, BlockHeight, ContractId};
use blockmart_events::Event;

use crate::error::TokenError;

/// Aggregate root: Token (fungible-balance ledger).
///
/// The minter identity is fixed at construction. Transfers and burns are open
/// to any holder with sufficient balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    id: ContractId,
    minter: AccountId,
    name: String,
    symbol: String,
    decimals: u8,
    balances: HashMap<AccountId, u128>,
    total_supply: u128,
    version: u64,
}

impl Token {
    pub fn new(
        id: ContractId,
        minter: AccountId,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            id,
            minter,
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            balances: HashMap::new(),
            total_supply: 0,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> ContractId {
        self.id
    }

    pub fn minter(&self) -> AccountId {
        self.minter
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Balance of an account; unknown accounts hold zero.
    pub fn balance_of(&self, account: AccountId) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }
}

impl AggregateRoot for Token {
    type Id = ContractId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: Mint (minter only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    pub caller: AccountId,
    pub to: AccountId,
    pub amount: u128,
    pub height: BlockHeight,
}

/// Command: Transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub caller: AccountId,
    pub to: AccountId,
    pub amount: u128,
    pub height: BlockHeight,
}

/// Command: Burn (from the caller's own balance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burn {
    pub caller: AccountId,
    pub amount: u128,
    pub height: BlockHeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCommand {
    Mint(Mint),
    Transfer(Transfer),
    Burn(Burn),
}

/// Event: Minted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minted {
    pub to: AccountId,
    pub amount: u128,
    pub height: BlockHeight,
}

/// Event: Transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128,
    pub height: BlockHeight,
}

/// Event: Burned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burned {
    pub from: AccountId,
    pub amount: u128,
    pub height: BlockHeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    Minted(Minted),
    Transferred(Transferred),
    Burned(Burned),
}

impl Event for TokenEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TokenEvent::Minted(_) => "token.minted",
            TokenEvent::Transferred(_) => "token.transferred",
            TokenEvent::Burned(_) => "token.burned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn height(&self) -> BlockHeight {
        match self {
            TokenEvent::Minted(e) => e.height,
            TokenEvent::Transferred(e) => e.height,
            TokenEvent::Burned(e) => e.height,
        }
    }
}

impl Aggregate for Token {
    type Command = TokenCommand;
    type Event = TokenEvent;
    type Error = TokenError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TokenEvent::Minted(e) => {
                let balance = self.balances.entry(e.to).or_insert(0);
                *balance = balance.saturating_add(e.amount);
                self.total_supply = self.total_supply.saturating_add(e.amount);
            }
            TokenEvent::Transferred(e) => {
                if let Some(balance) = self.balances.get_mut(&e.from) {
                    *balance = balance.saturating_sub(e.amount);
                }
                let balance = self.balances.entry(e.to).or_insert(0);
                *balance = balance.saturating_add(e.amount);
            }
            TokenEvent::Burned(e) => {
                if let Some(balance) = self.balances.get_mut(&e.from) {
                    *balance = balance.saturating_sub(e.amount);
                }
                self.total_supply = self.total_supply.saturating_sub(e.amount);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TokenCommand::Mint(cmd) => self.handle_mint(cmd),
            TokenCommand::Transfer(cmd) => self.handle_transfer(cmd),
            TokenCommand::Burn(cmd) => self.handle_burn(cmd),
        }
    }
}

impl Token {
    fn ensure_balance(&self, holder: AccountId, amount: u128) -> Result<(), TokenError> {
        if self.balance_of(holder) < amount {
            return Err(TokenError::insufficient_balance(
                "amount exceeds the holder's balance",
            ));
        }
        Ok(())
    }

    fn handle_mint(&self, cmd: &Mint) -> Result<Vec<TokenEvent>, TokenError> {
        if cmd.caller != self.minter {
            return Err(TokenError::authorization("caller is not the minter"));
        }
        if self.total_supply.checked_add(cmd.amount).is_none() {
            return Err(TokenError::overflow("total supply would overflow"));
        }
        if self.balance_of(cmd.to).checked_add(cmd.amount).is_none() {
            return Err(TokenError::overflow("recipient balance would overflow"));
        }

        Ok(vec![TokenEvent::Minted(Minted {
            to: cmd.to,
            amount: cmd.amount,
            height: cmd.height,
        })])
    }

    fn handle_transfer(&self, cmd: &Transfer) -> Result<Vec<TokenEvent>, TokenError> {
        self.ensure_balance(cmd.caller, cmd.amount)?;
        if cmd.to != cmd.caller && self.balance_of(cmd.to).checked_add(cmd.amount).is_none() {
            return Err(TokenError::overflow("recipient balance would overflow"));
        }

        Ok(vec![TokenEvent::Transferred(Transferred {
            from: cmd.caller,
            to: cmd.to,
            amount: cmd.amount,
            height: cmd.height,
        })])
    }

    fn handle_burn(&self, cmd: &Burn) -> Result<Vec<TokenEvent>, TokenError> {
        self.ensure_balance(cmd.caller, cmd.amount)?;

        Ok(vec![TokenEvent::Burned(Burned {
            from: cmd.caller,
            amount: cmd.amount,
            height: cmd.height,
        })])
    }
}
