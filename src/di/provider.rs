use crate::di::{Injectable, Token};
use crate::error::{BoxError, RapidError, Result};
use crate::metadata::{ClassRef, Instance};
use std::fmt;
use std::sync::Arc;

/// Builds an instance from the resolved `inject` list of a factory provider.
pub type Factory =
    Arc<dyn Fn(FactoryArgs) -> std::result::Result<Instance, BoxError> + Send + Sync>;

/// A registration recipe.
///
/// A bare class registers under its own token. An explicit provider names
/// the token and one of three strategies.
#[derive(Clone)]
pub enum Provider {
    Class(ClassRef),
    Explicit {
        provide: Token,
        strategy: ProviderStrategy,
    },
}

#[derive(Clone)]
pub enum ProviderStrategy {
    UseClass(ClassRef),
    UseValue(Instance),
    UseFactory { inject: Vec<Token>, factory: Factory },
}

impl Provider {
    pub fn class<T: Injectable>() -> Self {
        Provider::Class(ClassRef::injectable::<T>())
    }

    /// Starts an explicit provider for `token`.
    ///
    /// ```
    /// use rapidfast::Provider;
    ///
    /// let provider = Provider::provide("GREETING").use_value(String::from("hello"));
    /// assert_eq!(provider.token().to_string(), "\"GREETING\"");
    /// ```
    pub fn provide(token: impl Into<Token>) -> ProviderBuilder {
        ProviderBuilder {
            provide: token.into(),
        }
    }

    /// Registers `Impl` behind the trait object `Trait`.
    ///
    /// `Impl` is resolved (and constructed if needed) from the container; the
    /// caster turns it into the trait object stored under `Token::of_dyn::<Trait>()`.
    pub fn bind<Trait, Impl, F>(caster: F) -> Self
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Injectable,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        Provider::provide(Token::of_dyn::<Trait>()).use_factory(
            [Token::of::<Impl>()],
            move |args: &FactoryArgs| Ok::<_, RapidError>(caster(args.get::<Impl>(0)?)),
        )
    }

    pub fn token(&self) -> Token {
        match self {
            Provider::Class(class) => Token::Class(*class),
            Provider::Explicit { provide, .. } => provide.clone(),
        }
    }
}

impl From<ClassRef> for Provider {
    fn from(class: ClassRef) -> Self {
        Provider::Class(class)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Class(class) => f.debug_tuple("Class").field(class).finish(),
            Provider::Explicit { provide, strategy } => {
                let strategy = match strategy {
                    ProviderStrategy::UseClass(class) => format!("useClass({})", class.name()),
                    ProviderStrategy::UseValue(_) => "useValue".to_owned(),
                    ProviderStrategy::UseFactory { inject, .. } => {
                        format!("useFactory(inject: {})", inject.len())
                    }
                };
                f.debug_struct("Explicit")
                    .field("provide", provide)
                    .field("strategy", &strategy)
                    .finish()
            }
        }
    }
}

pub struct ProviderBuilder {
    provide: Token,
}

impl ProviderBuilder {
    pub fn use_value<V: Send + Sync + 'static>(self, value: V) -> Provider {
        self.strategy(ProviderStrategy::UseValue(Arc::new(value)))
    }

    /// Registers an already shared value without wrapping it again.
    pub fn use_instance(self, instance: Instance) -> Provider {
        self.strategy(ProviderStrategy::UseValue(instance))
    }

    pub fn use_class<T: Injectable>(self) -> Provider {
        self.strategy(ProviderStrategy::UseClass(ClassRef::injectable::<T>()))
    }

    /// Registers the result of `factory`, called once with the resolved
    /// `inject` tokens in order.
    pub fn use_factory<I, F, V, E>(self, inject: I, factory: F) -> Provider
    where
        I: IntoIterator<Item = Token>,
        F: Fn(&FactoryArgs) -> std::result::Result<V, E> + Send + Sync + 'static,
        V: Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let factory: Factory = Arc::new(move |args: FactoryArgs| {
            factory(&args)
                .map(|value| Arc::new(value) as Instance)
                .map_err(Into::into)
        });
        self.strategy(ProviderStrategy::UseFactory {
            inject: inject.into_iter().collect(),
            factory,
        })
    }

    fn strategy(self, strategy: ProviderStrategy) -> Provider {
        Provider::Explicit {
            provide: self.provide,
            strategy,
        }
    }
}

/// Resolved dependencies handed to a factory.
pub struct FactoryArgs {
    deps: Vec<(Token, Instance)>,
}

impl FactoryArgs {
    pub(crate) fn new(deps: Vec<(Token, Instance)>) -> Self {
        Self { deps }
    }

    /// Dependency at `index`, downcast to `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>> {
        let (token, instance) = self.entry(index)?;
        instance
            .clone()
            .downcast::<T>()
            .map_err(|_| RapidError::DowncastFailed {
                type_name: format!("{} as {}", token, std::any::type_name::<T>()),
            })
    }

    /// Dependency at `index` that was registered as an `Arc<T>` trait object.
    pub fn get_dyn<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>> {
        self.get::<Arc<T>>(index).map(|wrapper| wrapper.as_ref().clone())
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    fn entry(&self, index: usize) -> Result<&(Token, Instance)> {
        self.deps
            .get(index)
            .ok_or_else(|| RapidError::DependencyNotFound {
                type_name: format!("factory argument #{index}"),
            })
    }
}
