//! Price Oracle Program
//!
//! A single-authority price feed. Each feed is one `PriceRecord` stored at
//! an address derived from a seed and the program id, holding a price, its
//! decimal scale and the identity allowed to change it.
//!
//! ## Instructions
//!
//! | Instruction | Who | Effect |
//! |---|---|---|
//! | `initialize(price, decimals)` | anyone, once per seed | creates the record with the signer as authority |
//! | `update_price(new_price)` | stored authority only | replaces `price` |
//! | `get_price()` | anyone | publishes a `PriceInfo` event |
//!
//! ## Validate, Then Apply
//!
//! Every handler finishes all of its checks (derivation, existence,
//! authority) before it writes anything or publishes anything. A rejected
//! instruction leaves the stored bytes and the event bus untouched.
//!
//! ```text
//! request ──> derive / load ──> check authority ──> write record ──> Receipt
//!                  │                    │
//!                  └── error ───────────┴──> nothing changed
//! ```

pub mod bus;
pub mod config;
pub mod store;


use oracle_common::{
    AddressDeriver, Address, EventLog, OracleAction, OracleError, OracleEvent, OracleResult,
    PriceInfo, PriceRecord, ProgramDerivation,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

pub use bus::{EventBus, EventListener, ListenerError};
pub use config::OracleConfig;
pub use store::PriceRecordStore;

// ============ Request / Receipt ============

/// Accounts supplied with an instruction
#[derive(Debug, Clone, Copy)]
pub struct OracleAccounts<'a> {
    /// Seed the record address is derived from
    pub seed: &'a [u8],
    /// Address the caller claims holds the record
    pub price_record: Address,
    /// Identity that signed the request
    pub signer: Address,
}

impl<'a> OracleAccounts<'a> {
    /// Accounts for `seed` at `price_record`, signed by `signer`
    pub fn new(seed: &'a [u8], price_record: Address, signer: Address) -> Self {
        Self {
            seed,
            price_record,
            signer,
        }
    }
}

/// Result of a successful instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Instruction name, e.g. `update_price`
    pub instruction: String,
    /// Record the instruction ran against
    pub price_record: Address,
    /// Program log lines, in order
    pub logs: Vec<String>,
    /// Events emitted by the instruction
    pub events: Vec<OracleEvent>,
}

/// Per-instruction scratch state
struct OracleContext {
    logs: Vec<String>,
    events: EventLog,
}

impl OracleContext {
    fn new() -> Self {
        Self {
            logs: Vec::new(),
            events: EventLog::new(),
        }
    }

    fn log(&mut self, line: String) {
        info!(target: "price_oracle::program", "{}", line);
        self.logs.push(line);
    }

    fn into_receipt(self, action: &OracleAction, price_record: Address) -> Receipt {
        Receipt {
            instruction: action.name().to_string(),
            price_record,
            logs: self.logs,
            events: self.events.into_events(),
        }
    }
}

// ============ Program ============

/// Oracle program instance: configuration, record store and event bus
#[derive(Debug)]
pub struct OracleProgram<D: AddressDeriver = ProgramDerivation> {
    config: OracleConfig,
    store: PriceRecordStore,
    bus: EventBus,
    deriver: D,
}

impl OracleProgram<ProgramDerivation> {
    /// Create a program using the standard address derivation
    pub fn new(config: OracleConfig) -> Self {
        Self::with_deriver(config, ProgramDerivation)
    }
}

impl Default for OracleProgram<ProgramDerivation> {
    fn default() -> Self {
        Self::new(OracleConfig::default())
    }
}

impl<D: AddressDeriver> OracleProgram<D> {
    /// Create a program with a custom address deriver
    pub fn with_deriver(config: OracleConfig, deriver: D) -> Self {
        let bus = EventBus::with_capacity(config.event_capacity);
        Self {
            config,
            store: PriceRecordStore::new(),
            bus,
            deriver,
        }
    }

    /// Program identity
    pub fn program_id(&self) -> &Address {
        &self.config.program_id
    }

    /// Active configuration
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Address and canonical bump of the record for `seed`
    pub fn derive_address(&self, seed: &[u8]) -> OracleResult<(Address, u8)> {
        self.deriver
            .find_program_address(&[seed], &self.config.program_id)
    }

    // ============ Queries ============

    /// Decoded record at `address`
    pub fn fetch(&self, address: &Address) -> OracleResult<PriceRecord> {
        self.store.fetch(address)
    }

    /// Raw persisted bytes at `address`
    pub fn account_data(&self, address: &Address) -> Option<&[u8]> {
        self.store.account_data(address)
    }

    /// Read-only view of the store
    pub fn store(&self) -> &PriceRecordStore {
        &self.store
    }

    /// Handle to the event bus, e.g. for registering listeners elsewhere
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Register a listener for all events
    pub fn subscribe(&self) -> EventListener {
        self.bus.subscribe()
    }

    // ============ Entry Points ============

    /// Decode instruction bytes and execute them
    pub fn process_raw(&mut self, accounts: &OracleAccounts<'_>, data: &[u8]) -> OracleResult<Receipt> {
        let action = OracleAction::try_from_bytes(data)?;
        self.process(accounts, &action)
    }

    /// Execute one instruction to completion
    #[instrument(
        skip(self, accounts),
        fields(instruction = action.name(), record = %accounts.price_record)
    )]
    pub fn process(&mut self, accounts: &OracleAccounts<'_>, action: &OracleAction) -> OracleResult<Receipt> {
        let mut ctx = OracleContext::new();

        let result = match action {
            OracleAction::Initialize {
                initial_price,
                decimals,
            } => self.initialize(&mut ctx, accounts, *initial_price, *decimals),
            OracleAction::UpdatePrice { new_price } => self.update_price(&mut ctx, accounts, *new_price),
            OracleAction::GetPrice => self.get_price(&mut ctx, accounts),
        };

        match result {
            Ok(()) => Ok(ctx.into_receipt(action, accounts.price_record)),
            Err(err) => {
                warn!(
                    code = err.code(),
                    number = err.number(),
                    recoverable = err.is_recoverable(),
                    "Instruction rejected: {}",
                    err
                );
                Err(err)
            }
        }
    }

    // ============ Handlers ============

    /// Create the record for `accounts.seed`
    fn initialize(
        &mut self,
        ctx: &mut OracleContext,
        accounts: &OracleAccounts<'_>,
        initial_price: u64,
        decimals: u8,
    ) -> OracleResult<()> {
        // 1. Caller-supplied address must be the derived one
        let (expected, bump) = self.derive_address(accounts.seed)?;
        if accounts.price_record != expected {
            return Err(OracleError::AddressMismatch {
                expected,
                actual: accounts.price_record,
            });
        }

        // 2. Only once per seed
        if self.store.contains(&expected) {
            return Err(OracleError::AlreadyInitialized { address: expected });
        }

        // 3. Signer becomes the authority
        let record = PriceRecord::new(accounts.signer, initial_price, decimals, bump);
        self.store.create(expected, &record)?;

        ctx.log("Price Oracle Initialized!".to_string());
        ctx.log(format!("Authority: {}", record.authority));
        ctx.log(format!("Initial Price: {}", record.price));
        ctx.log(format!("Decimals: {}", record.decimals));
        ctx.log(format!("Bump: {}", record.bump));
        Ok(())
    }

    /// Replace the price; authority only
    fn update_price(
        &mut self,
        ctx: &mut OracleContext,
        accounts: &OracleAccounts<'_>,
        new_price: u64,
    ) -> OracleResult<()> {
        // 1. Record must exist at a valid derived address
        let record = self.load_record(accounts)?;

        // 2. Only the stored authority can update
        if !record.is_authority(&accounts.signer) {
            return Err(OracleError::InvalidAuthority {
                expected: record.authority,
                actual: accounts.signer,
            });
        }

        // 3. Write the new price; everything else is carried over
        let updated = PriceRecord {
            price: new_price,
            ..record
        };
        self.store.commit(accounts.price_record, &updated)?;

        ctx.log("Price Updated!".to_string());
        ctx.log(format!("New Price: {}", updated.price));
        Ok(())
    }

    /// Publish the current record; no authority required
    fn get_price(&self, ctx: &mut OracleContext, accounts: &OracleAccounts<'_>) -> OracleResult<()> {
        let record = self.load_record(accounts)?;

        ctx.log("Current Price Information:".to_string());
        ctx.log(format!("Price: {}", record.price));
        ctx.log(format!("Decimals: {}", record.decimals));
        ctx.log(format!("Authority: {}", record.authority));

        let event = OracleEvent::PriceInfo(PriceInfo::from(&record));
        ctx.events.emit(event.clone());
        self.bus.publish(event);
        Ok(())
    }

    /// Load the record and re-derive its address from the stored bump
    fn load_record(&self, accounts: &OracleAccounts<'_>) -> OracleResult<PriceRecord> {
        let record = self.store.fetch(&accounts.price_record)?;

        let expected = self
            .deriver
            .create_program_address(&[accounts.seed, &[record.bump]], &self.config.program_id)?;
        if expected != accounts.price_record {
            return Err(OracleError::AddressMismatch {
                expected,
                actual: accounts.price_record,
            });
        }

        Ok(record)
    }
}
