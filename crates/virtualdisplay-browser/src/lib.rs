// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Virtualdisplay browser bridge: WASM bindings that embed the viewer.
//!
//! Hosts the `virtualdisplay-core` engine in a page. The viewer runs in an
//! `<iframe>`; outbound messages go through `postMessage`, inbound ones are
//! read from the window `message` event, and the iframe's `load` event is
//! the ready signal.
//!
//! # Usage (from JavaScript)
//!
//! ```js
//! import init, { VirtualdisplayViewer } from 'virtualdisplay-browser';
//!
//! await init();
//! const viewer = new VirtualdisplayViewer({ parent: '#viewer', model: 'chair', license: 'key' });
//! viewer.onReady(() => console.log(viewer.nodes()));
//! ```

pub mod error;
pub mod iframe;
pub mod logging;
pub mod mapping;
pub mod port;
pub mod viewer;

pub use iframe::{IframeBuilder, Parent};
pub use port::PostMessagePort;
pub use viewer::VirtualdisplayViewer;
