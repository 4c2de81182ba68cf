mod builder;
mod container;
mod injectable;
mod provider;
mod token;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use injectable::Injectable;
pub use provider::{Factory, FactoryArgs, Provider, ProviderBuilder, ProviderStrategy};
pub use token::{Symbol, Token};
