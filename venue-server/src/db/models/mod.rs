//! Database Models

// Serde helpers
pub mod serde_helpers;

// Auth / identity
pub mod user;

// Catalog
pub mod product;
pub mod song;

// Floor
pub mod table;

// Orders / billing
pub mod closing_history;
pub mod order;

// Re-exports
pub use closing_history::{ClosedBy, ClosingCreate, ClosingId, ClosingRecord};
pub use order::{
    Order, OrderCloseRequest, OrderCreate, OrderId, OrderItem, OrderItemCreate, OrderItemsUpdate,
    OrderPayment, OrderStatus, OrderStatusUpdate, PaymentMethod, SongRequest, SongRequestCreate,
    SongRequestStatus, SongRequestStatusUpdate,
};
pub use product::{Product, ProductCreate, ProductId, ProductUpdate, STATUS_AVAILABLE};
pub use song::{Song, SongCreate, SongId, SongUpdate};
pub use table::{
    AccountClosing, AccumulatedTotal, LineState, OrderLine, OrderLineCreate, ProductSnapshot,
    ServerRef, SongState, TableCreate, TableId, TableSongCreate, TableSongEntry, TableState,
    TableUpdate, VenueTable,
};
pub use user::{RoleRef, User, UserCreate, UserId, UserPublic, UserUpdate};
