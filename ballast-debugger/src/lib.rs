//! # Ballast Debugger
//!
//! The wire protocol between a Ballast ViewModel and an external debugger,
//! and the interceptor that speaks it.
//!
//! # Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`version`] | Client version parsing and serializer negotiation |
//! | [`model`] | JSON envelopes for events and actions |
//! | [`adapter`] | How Inputs, Events and States are written as text |
//! | [`interceptor`] | [`DebuggerInterceptor`] and its [`DebuggerConnection`] |
//!
//! # Example
//!
//! ```rust,ignore
//! let mapping = SerializerMapping::negotiate(&client_hello.version)?;
//! let (debugger, mut connection) = DebuggerInterceptor::new(JsonDebuggerAdapter);
//!
//! let view_model = ViewModel::builder(state, handler)
//!     .interceptor(debugger)
//!     .build();
//! view_model.start();
//!
//! loop {
//!     tokio::select! {
//!         Some(event) = connection.next_event() => socket.send(mapping.encode_event(&event)?).await?,
//!         Some(text) = socket.next() => connection.send_action(mapping.decode_action(&text?)?)?,
//!     }
//! }
//! ```

pub mod adapter;
pub mod error;
pub mod interceptor;
pub mod model;
pub mod version;

pub use adapter::{DebuggerAdapter, JsonDebuggerAdapter, SerializedPayload, ToStringDebuggerAdapter};
pub use error::DebuggerError;
pub use interceptor::{DEFAULT_HISTORY_CAPACITY, DebuggerConnection, DebuggerInterceptor};
pub use model::{
    BallastDebuggerAction, BallastDebuggerEvent, DebuggerActionPayload, DebuggerEventPayload,
};
pub use version::{ClientVersion, SerializerMapping};
