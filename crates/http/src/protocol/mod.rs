//! Core protocol types shared by the codecs and the connection.
//!
//! # Components
//!
//! - **Methods** ([`method`]): [`HttpMethod`] and [`MethodSet`]
//! - **Status codes** ([`status`]): the supported status set and its reason phrases
//! - **Requests** ([`request`]): [`RawRequest`], the fully buffered request the transport delivers
//! - **Responses** ([`response`]): [`ResponseHead`], status line plus output headers
//! - **Arguments** ([`arguments`]): [`Arguments`], the ordered multimap used for query and body arguments
//! - **Messages** ([`message`]): [`Message`], [`PayloadItem`] and [`PayloadSize`] fed to the response encoder
//! - **Errors** (`error`): [`ParseError`] and [`SendError`]

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod method;
pub use method::HttpMethod;
pub use method::MethodSet;

pub mod status;

mod arguments;
pub use arguments::Arguments;

mod request;
pub use request::RawRequest;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::ParseError;
pub use error::SendError;
