//! # Execution instance registry
//!
//! Algorithms and operators are configured through *descriptions*:
//! immutable, shareable values that say what to build. At the start of a
//! run every description is instantiated once into an *instance* that does
//! the work and may hold per-run state (a deadline, a counter, a cache).
//!
//! The [`InstanceRegistry`] memoizes this instantiation by description
//! identity, so a description referenced from several places in one
//! algorithm yields one shared instance. A new registry is created for
//! every run, which keeps instances from leaking state between runs.
//!
//! Any operator that is `Clone + 'static` becomes a description when wrapped
//! in [`Stateless`]: its instance is a clone of it. Composite or stateful
//! operators implement the description traits by hand and resolve their
//! children through the registry they receive.
//!
//! ```rust
//! use std::sync::Arc;
//! use genalps::operators::NoChangeMutator;
//! use genalps::problem::Unconstrained;
//! use genalps::registry::{InstanceRegistry, MutatorDescription, Stateless};
//!
//! let description: Arc<dyn MutatorDescription<u8, Unconstrained, ()>> =
//!     Arc::new(Stateless(NoChangeMutator));
//!
//! let mut registry = InstanceRegistry::new();
//! let first = registry.mutator(&description).unwrap();
//! let second = registry.mutator(&description).unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{GeneticError, Result};
use crate::operators::{Creator, Crossover, Evaluator, Mutator, Replacer, Selector};
use crate::termination::Terminator;

pub trait CreatorDescription<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_instance(&self, registry: &mut InstanceRegistry)
        -> Result<Arc<dyn Creator<G, S, P>>>;
}

pub trait CrossoverDescription<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Crossover<G, S, P>>>;
}

pub trait MutatorDescription<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_instance(&self, registry: &mut InstanceRegistry)
        -> Result<Arc<dyn Mutator<G, S, P>>>;
}

pub trait EvaluatorDescription<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Evaluator<G, S, P>>>;
}

pub trait SelectorDescription<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Selector<G, S, P>>>;
}

pub trait ReplacerDescription<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Replacer<G, S, P>>>;
}

/// Describes a termination criterion over algorithm states `St`.
pub trait TerminatorDescription<St, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Terminator<St, S, P>>>;
}

/// Describes an operator whose instance is a plain clone of it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stateless<T>(pub T);

macro_rules! stateless_description {
    ($description:ident, $capability:ident, $param:ident) => {
        impl<$param, S: ?Sized, P: ?Sized, T> $description<$param, S, P> for Stateless<T>
        where
            T: $capability<$param, S, P> + Clone + 'static,
        {
            fn create_instance(
                &self,
                _registry: &mut InstanceRegistry,
            ) -> Result<Arc<dyn $capability<$param, S, P>>> {
                Ok(Arc::new(self.0.clone()))
            }
        }
    };
}

stateless_description!(CreatorDescription, Creator, G);
stateless_description!(CrossoverDescription, Crossover, G);
stateless_description!(MutatorDescription, Mutator, G);
stateless_description!(EvaluatorDescription, Evaluator, G);
stateless_description!(SelectorDescription, Selector, G);
stateless_description!(ReplacerDescription, Replacer, G);
stateless_description!(TerminatorDescription, Terminator, St);

/// Makes a built-in, plain-data operator its own description.
///
/// The trait names are resolved where the macro is invoked.
macro_rules! self_describing {
    (<$($t:ident),*> $ty:ty => $description:ident, $capability:ident) => {
        impl<G, S: ?Sized, P: ?Sized, $($t),*> $description<G, S, P> for $ty
        where
            $ty: $capability<G, S, P> + Clone + 'static,
        {
            fn create_instance(
                &self,
                _registry: &mut $crate::registry::InstanceRegistry,
            ) -> $crate::error::Result<std::sync::Arc<dyn $capability<G, S, P>>> {
                Ok(std::sync::Arc::new(self.clone()))
            }
        }
    };
    ($ty:ty => $description:ident, $capability:ident) => {
        self_describing!(<> $ty => $description, $capability);
    };
}

pub(crate) use self_describing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InstanceKey {
    description: usize,
    instance: TypeId,
}

/// Per-run memo of description instances.
#[derive(Default)]
pub struct InstanceRegistry {
    instances: HashMap<InstanceKey, Box<dyn Any + Send + Sync>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Returns the instance registered for `description`, creating it with
    /// `create` on first use.
    ///
    /// Identity is the address of the shared description together with the
    /// instance type, so distinct `Arc`s holding equal values are distinct
    /// descriptions. Descriptions must outlive the run they are resolved in.
    pub fn get_or_create<D, I, F>(&mut self, description: &Arc<D>, create: F) -> Result<Arc<I>>
    where
        D: ?Sized,
        I: ?Sized + Send + Sync + 'static,
        F: FnOnce(&D, &mut Self) -> Result<Arc<I>>,
    {
        let key = InstanceKey {
            description: Arc::as_ptr(description) as *const () as usize,
            instance: TypeId::of::<Arc<I>>(),
        };

        if let Some(existing) = self.instances.get(&key) {
            return existing.downcast_ref::<Arc<I>>().cloned().ok_or_else(|| {
                GeneticError::Other("Registered instance has an unexpected type".to_string())
            });
        }

        let instance = create(&**description, self)?;
        self.instances.insert(key, Box::new(Arc::clone(&instance)));
        Ok(instance)
    }

    pub fn creator<G, S, P>(
        &mut self,
        description: &Arc<dyn CreatorDescription<G, S, P>>,
    ) -> Result<Arc<dyn Creator<G, S, P>>>
    where
        G: 'static,
        S: ?Sized + 'static,
        P: ?Sized + 'static,
    {
        self.get_or_create(description, |d, registry| d.create_instance(registry))
    }

    pub fn crossover<G, S, P>(
        &mut self,
        description: &Arc<dyn CrossoverDescription<G, S, P>>,
    ) -> Result<Arc<dyn Crossover<G, S, P>>>
    where
        G: 'static,
        S: ?Sized + 'static,
        P: ?Sized + 'static,
    {
        self.get_or_create(description, |d, registry| d.create_instance(registry))
    }

    pub fn mutator<G, S, P>(
        &mut self,
        description: &Arc<dyn MutatorDescription<G, S, P>>,
    ) -> Result<Arc<dyn Mutator<G, S, P>>>
    where
        G: 'static,
        S: ?Sized + 'static,
        P: ?Sized + 'static,
    {
        self.get_or_create(description, |d, registry| d.create_instance(registry))
    }

    pub fn evaluator<G, S, P>(
        &mut self,
        description: &Arc<dyn EvaluatorDescription<G, S, P>>,
    ) -> Result<Arc<dyn Evaluator<G, S, P>>>
    where
        G: 'static,
        S: ?Sized + 'static,
        P: ?Sized + 'static,
    {
        self.get_or_create(description, |d, registry| d.create_instance(registry))
    }

    pub fn selector<G, S, P>(
        &mut self,
        description: &Arc<dyn SelectorDescription<G, S, P>>,
    ) -> Result<Arc<dyn Selector<G, S, P>>>
    where
        G: 'static,
        S: ?Sized + 'static,
        P: ?Sized + 'static,
    {
        self.get_or_create(description, |d, registry| d.create_instance(registry))
    }

    pub fn replacer<G, S, P>(
        &mut self,
        description: &Arc<dyn ReplacerDescription<G, S, P>>,
    ) -> Result<Arc<dyn Replacer<G, S, P>>>
    where
        G: 'static,
        S: ?Sized + 'static,
        P: ?Sized + 'static,
    {
        self.get_or_create(description, |d, registry| d.create_instance(registry))
    }

    pub fn terminator<St, S, P>(
        &mut self,
        description: &Arc<dyn TerminatorDescription<St, S, P>>,
    ) -> Result<Arc<dyn Terminator<St, S, P>>>
    where
        St: 'static,
        S: ?Sized + 'static,
        P: ?Sized + 'static,
    {
        self.get_or_create(description, |d, registry| d.create_instance(registry))
    }
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("instances", &self.instances.len())
            .finish()
    }
}
