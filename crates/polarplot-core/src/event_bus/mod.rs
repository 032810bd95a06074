//! # Event Bus Module
//!
//! Publish/subscribe plumbing between Polarplot components.
//!
//! State owners publish typed events after every mutation. The session
//! console subscribes to print failed commands. The bus is an owned value
//! shared through `Arc`, there is no process-wide instance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polarplot_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, PreviewEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Preview]),
//!     |event| {
//!         if let AppEvent::Preview(change) = event {
//!             println!("redraw after {:?}", change);
//!         }
//!     },
//! );
//!
//! bus.publish(AppEvent::Preview(PreviewEvent::SourceChanged { segment_count: 3 }));
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
