pub mod config;
pub mod exception;
pub mod filter;
pub mod markdown;
pub mod param;
pub mod request;
pub mod resolver;
pub mod response;
pub mod router;
pub mod server;
pub mod site;
pub mod template;

pub use config::{Args, Config};
pub use exception::{Exception, RequestError, StartupError};
pub use filter::FilterSet;
pub use markdown::{CommonMark, Renderer};
pub use request::Request;
pub use resolver::ResolvedPath;
pub use response::Response;
pub use router::{respond, route, Outcome};
pub use site::Site;
pub use template::Templates;
