//! Errors for the keygen protocol.

use custody_cu::CuError;
use custody_order::{OrderError, OrderStatus};
use custody_primitives::{
    chain::ChainAdapterError,
    errors::CryptoError,
    types::{CuAddress, OrderId},
};
use custody_receipt::ReceiptError;
use custody_store::StoreError;
use thiserror::Error;

/// The result code reported for faults.
pub const CODE_INTERNAL: u32 = 1;

/// Errors raised while handling a keygen message.
///
/// Every variant except the fault class maps to a stable, non-zero result code so that all
/// validators report the same outcome for the same rejected message.
#[derive(Debug, Error)]
pub enum KeyGenError {
    /// The message is malformed.
    #[error("invalid message: {0}")]
    InvalidMsg(String),

    /// The transaction was not signed by the party the message names.
    #[error("message must be signed by {expected}, got {actual}")]
    UnauthorizedSigner {
        /// The party named in the message.
        expected: CuAddress,
        /// The transaction signer.
        actual: CuAddress,
    },

    /// The token is not configured or its chain is not supported.
    #[error("token {0} is not supported")]
    UnsupportedToken(String),

    /// No external address exists for the native token.
    #[error("token {0} is native")]
    NativeToken(String),

    /// The beneficiary already has an address for the symbol in this epoch.
    #[error("{cu} already has a {symbol} address")]
    AddressAlreadyExists {
        /// The beneficiary.
        cu: CuAddress,
        /// The token.
        symbol: String,
    },

    /// The operation unit is bound to a different symbol.
    #[error("operation unit is bound to {cu_symbol}, not {symbol}")]
    SymbolMismatch {
        /// The unit's symbol.
        cu_symbol: String,
        /// The requested symbol.
        symbol: String,
    },

    /// The address is not a key node of the current epoch.
    #[error("{0} is not a key node")]
    NotKeyNode(CuAddress),

    /// A keygen order for the beneficiary is already processing.
    #[error("keygen order {order_id} for {to} is still processing")]
    OrderInFlight {
        /// The beneficiary.
        to: CuAddress,
        /// The processing order.
        order_id: OrderId,
    },

    /// An order with this ID already exists.
    #[error("order {0} already exists")]
    DuplicateOrderId(OrderId),

    /// The epoch has no key nodes eligible for a ceremony.
    #[error("no key nodes available")]
    NoKeyNodes,

    /// The initiator cannot pay the open fee.
    #[error("insufficient fee: {0}")]
    InsufficientFee(CuError),

    /// No order with this ID exists.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The order is not a keygen order.
    #[error("order {0} is not a keygen order")]
    NotKeyGenOrder(OrderId),

    /// The order is in the wrong status for this message.
    #[error("order {order_id} is {status}")]
    UnexpectedStatus {
        /// The order.
        order_id: OrderId,
        /// Its status.
        status: OrderStatus,
    },

    /// The message refers to a different epoch than the current one.
    #[error("epoch {actual} is stale, current epoch is {expected}")]
    StaleEpoch {
        /// The current epoch.
        expected: u64,
        /// The epoch in the message or order.
        actual: u64,
    },

    /// The signers do not match the order's key nodes.
    #[error("key nodes do not match the order")]
    KeyNodesMismatch,

    /// The reported public key differs from the order's.
    #[error("public key does not match order {0}")]
    PubkeyMismatch(OrderId),

    /// A key or signature is invalid.
    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),

    /// The operation requires the current epoch's migration to be finished.
    #[error("migration of epoch {0} is not finished")]
    MigrationNotFinished(u64),

    /// The operation requires the current epoch's migration to be in progress.
    #[error("migration of epoch {0} is already finished")]
    MigrationFinished(u64),

    /// Orders are processing.
    #[error("{0} orders are still processing")]
    OrdersProcessing(usize),

    /// Too many orders in one request.
    #[error("requested {requested} orders, at most {max} allowed")]
    TooManyOrders {
        /// The number of orders requested.
        requested: usize,
        /// The limit.
        max: usize,
    },

    /// The wait-assign pool cannot take the orders.
    #[error("wait-assign pool holds {pooled}, cannot add {requested} (max {max})")]
    PoolFull {
        /// Orders already pooled.
        pooled: usize,
        /// Orders requested.
        requested: usize,
        /// The limit.
        max: usize,
    },

    /// The number of orders differs from the number of operation units.
    #[error("expected {expected} orders, got {actual}")]
    OpCuCountMismatch {
        /// The number of operation units.
        expected: usize,
        /// The number of orders.
        actual: usize,
    },

    /// The symbol already has the maximum number of operation units.
    #[error("{symbol} already has {max} operation units")]
    OpCuLimitReached {
        /// The token.
        symbol: String,
        /// The limit.
        max: u64,
    },

    /// The address already belongs to a custodian unit.
    #[error("address {0} is already in use")]
    AddressInUse(CuAddress),

    /// The chain adapter rejected the request.
    #[error("chain adapter: {0}")]
    ChainAdapter(#[from] ChainAdapterError),

    /// A custodian unit rejected the change.
    #[error("custodian unit: {0}")]
    Cu(CuError),

    /// The state backend failed.
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// A state that correct handlers never produce.
    #[error("fault: {0}")]
    Fault(String),
}

impl KeyGenError {
    /// Returns true for errors that indicate a bug or corrupted state rather than a bad message.
    pub const fn is_fault(&self) -> bool {
        matches!(self, KeyGenError::Store(_) | KeyGenError::Fault(_))
    }

    /// Returns the result code reported for this error.
    pub const fn code(&self) -> u32 {
        match self {
            KeyGenError::InvalidMsg(_) => 2,
            KeyGenError::UnauthorizedSigner { .. } => 3,
            KeyGenError::UnsupportedToken(_) => 4,
            KeyGenError::NativeToken(_) => 5,
            KeyGenError::AddressAlreadyExists { .. } => 6,
            KeyGenError::SymbolMismatch { .. } => 7,
            KeyGenError::NotKeyNode(_) => 8,
            KeyGenError::OrderInFlight { .. } => 9,
            KeyGenError::DuplicateOrderId(_) => 10,
            KeyGenError::NoKeyNodes => 11,
            KeyGenError::InsufficientFee(_) => 12,
            KeyGenError::OrderNotFound(_) => 13,
            KeyGenError::NotKeyGenOrder(_) => 14,
            KeyGenError::UnexpectedStatus { .. } => 15,
            KeyGenError::StaleEpoch { .. } => 16,
            KeyGenError::KeyNodesMismatch => 17,
            KeyGenError::PubkeyMismatch(_) => 18,
            KeyGenError::Crypto(_) => 19,
            KeyGenError::MigrationNotFinished(_) => 20,
            KeyGenError::MigrationFinished(_) => 21,
            KeyGenError::OrdersProcessing(_) => 22,
            KeyGenError::TooManyOrders { .. } => 23,
            KeyGenError::PoolFull { .. } => 24,
            KeyGenError::OpCuCountMismatch { .. } => 25,
            KeyGenError::OpCuLimitReached { .. } => 26,
            KeyGenError::AddressInUse(_) => 27,
            KeyGenError::ChainAdapter(_) => 28,
            KeyGenError::Cu(_) => 29,
            KeyGenError::Store(_) | KeyGenError::Fault(_) => CODE_INTERNAL,
        }
    }
}

impl From<CuError> for KeyGenError {
    fn from(e: CuError) -> Self {
        match e {
            CuError::Store(e) => KeyGenError::Store(e),
            CuError::Fault(reason) => KeyGenError::Fault(reason),
            other => KeyGenError::Cu(other),
        }
    }
}

impl From<OrderError> for KeyGenError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Store(e) => KeyGenError::Store(e),
            OrderError::MalformedIndexKey(key) => {
                KeyGenError::Fault(format!("malformed processing index key {key}"))
            }
        }
    }
}

impl From<ReceiptError> for KeyGenError {
    fn from(e: ReceiptError) -> Self {
        KeyGenError::Fault(format!("receipt: {e}"))
    }
}

impl KeyGenError {
    /// Classifies a failure to hold the open fee. Storage failures and faults stay faults.
    pub(crate) fn insufficient_fee(e: CuError) -> Self {
        match e {
            CuError::Store(_) | CuError::Fault(_) => e.into(),
            other => KeyGenError::InsufficientFee(other),
        }
    }
}

/// Result type alias for keygen operations.
pub type KeyGenResult<T> = Result<T, KeyGenError>;
