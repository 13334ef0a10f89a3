//! Field plans: the per-record list of wire bindings.
//!
//! A record describes itself once through [`Record::describe`]; the result is
//! validated into a [`FieldPlan`] and cached for the life of the process,
//! keyed by `TypeId`. Concurrent first users of a type share one `OnceLock`,
//! so a plan is built exactly once and never observed half-built.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::decode::DecodeContext;
use crate::encode::{EncodeContext, Encoded};
use crate::error::{DecodeError, EncodeError, PlanError};
use crate::field::{Field, Shape};
use crate::scan::Node;
use crate::tag::{Format, Role, Tag};

/// A native record bound to a JSON object.
///
/// ```ignore
/// #[derive(Default)]
/// struct Server {
///     name: Str,
///     id: Int64,
/// }
///
/// impl Record for Server {
///     fn describe(plan: &mut PlanBuilder<Self>) {
///         plan.field("name", |r| &r.name, |r| &mut r.name)
///             .field("id,computed", |r| &r.id, |r| &mut r.id);
///     }
/// }
///
/// record_field!(Server);
/// ```
pub trait Record: Default + 'static {
    fn describe(plan: &mut PlanBuilder<Self>);
}

/// Type-erased access to one binding's field inside a record.
pub(crate) trait Access<T>: Send + Sync {
    fn decode(&self, target: &mut T, node: &Node<'_>, cx: DecodeContext<'_>)
        -> Result<(), DecodeError>;

    fn decode_member(
        &self,
        target: &mut T,
        key: &str,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError>;

    fn encode(&self, source: &T, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError>;

    fn encode_members(
        &self,
        source: &T,
        cx: EncodeContext,
    ) -> Result<Vec<(String, Encoded)>, EncodeError>;

    fn update(
        &self,
        new: &T,
        old: Option<&T>,
        cx: EncodeContext,
    ) -> Result<Option<Encoded>, EncodeError>;
}

/// A field declared directly on the record.
struct Direct<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T: 'static, F: Field> Access<T> for Direct<T, F> {
    fn decode(
        &self,
        target: &mut T,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError> {
        (self.get_mut)(target).decode(node, cx)
    }

    fn decode_member(
        &self,
        target: &mut T,
        key: &str,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError> {
        (self.get_mut)(target).decode_member(key, node, cx)
    }

    fn encode(&self, source: &T, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        (self.get)(source).encode(cx)
    }

    fn encode_members(
        &self,
        source: &T,
        cx: EncodeContext,
    ) -> Result<Vec<(String, Encoded)>, EncodeError> {
        (self.get)(source).encode_members(cx)
    }

    fn update(
        &self,
        new: &T,
        old: Option<&T>,
        cx: EncodeContext,
    ) -> Result<Option<Encoded>, EncodeError> {
        (self.get)(new).encode_update(old.map(self.get), cx)
    }
}

/// A binding of an embedded record, reached through the embedding field.
struct Embedded<T, E> {
    get: fn(&T) -> &E,
    get_mut: fn(&mut T) -> &mut E,
    inner: Arc<dyn Access<E>>,
}

impl<T: 'static, E: 'static> Access<T> for Embedded<T, E> {
    fn decode(
        &self,
        target: &mut T,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError> {
        self.inner.decode((self.get_mut)(target), node, cx)
    }

    fn decode_member(
        &self,
        target: &mut T,
        key: &str,
        node: &Node<'_>,
        cx: DecodeContext<'_>,
    ) -> Result<(), DecodeError> {
        self.inner.decode_member((self.get_mut)(target), key, node, cx)
    }

    fn encode(&self, source: &T, cx: EncodeContext) -> Result<Option<Encoded>, EncodeError> {
        self.inner.encode((self.get)(source), cx)
    }

    fn encode_members(
        &self,
        source: &T,
        cx: EncodeContext,
    ) -> Result<Vec<(String, Encoded)>, EncodeError> {
        self.inner.encode_members((self.get)(source), cx)
    }

    fn update(
        &self,
        new: &T,
        old: Option<&T>,
        cx: EncodeContext,
    ) -> Result<Option<Encoded>, EncodeError> {
        self.inner.update((self.get)(new), old.map(self.get), cx)
    }
}

/// One field's wire key, role and flags.
pub struct Binding<T> {
    key: String,
    role: Role,
    computed: bool,
    format: Format,
    shape: Shape,
    /// Embedding depth; fields declared on the record itself are at 0.
    depth: usize,
    access: Arc<dyn Access<T>>,
}

impl<T> Binding<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn access(&self) -> &dyn Access<T> {
        self.access.as_ref()
    }
}

impl<T> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("role", &self.role)
            .field("computed", &self.computed)
            .field("format", &self.format)
            .field("shape", &self.shape)
            .field("depth", &self.depth)
            .finish()
    }
}

/// Collects the bindings a record declares. The first problem found is
/// kept and reported when the plan is finished.
pub struct PlanBuilder<T> {
    bindings: Vec<Binding<T>>,
    error: Option<PlanError>,
}

impl<T: Record> PlanBuilder<T> {
    fn new() -> Self {
        Self {
            bindings: Vec::new(),
            error: None,
        }
    }

    fn fail(&mut self, err: PlanError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn field<F: Field>(
        &mut self,
        tag: &str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> &mut Self {
        self.formatted(tag, Format::None, get, get_mut)
    }

    /// Like [`PlanBuilder::field`], with a date formatting hint.
    pub fn formatted<F: Field>(
        &mut self,
        tag: &str,
        format: Format,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> &mut Self {
        let record = type_name::<T>();
        let parsed = match Tag::parse(tag) {
            Ok(parsed) => parsed,
            Err(reason) => {
                self.fail(PlanError::MalformedTag {
                    record,
                    tag: tag.to_owned(),
                    reason,
                });
                return self;
            }
        };
        if parsed.role == Role::Extras && F::shape() != Shape::Mapping {
            self.fail(PlanError::ExtrasNotMapping {
                record,
                shape: F::shape().name(),
            });
            return self;
        }
        self.bindings.push(Binding {
            key: parsed.key,
            role: parsed.role,
            computed: parsed.computed,
            format,
            shape: F::shape(),
            depth: 0,
            access: Arc::new(Direct { get, get_mut }),
        });
        self
    }

    /// Flattens the bindings of an embedded record into this one.
    pub fn embed<E: Record>(
        &mut self,
        get: fn(&T) -> &E,
        get_mut: fn(&mut T) -> &mut E,
    ) -> &mut Self {
        let mut inner = PlanBuilder::<E>::new();
        E::describe(&mut inner);
        if let Some(err) = inner.error {
            self.fail(err);
            return self;
        }
        for binding in inner.bindings {
            self.bindings.push(Binding {
                key: binding.key,
                role: binding.role,
                computed: binding.computed,
                format: binding.format,
                shape: binding.shape,
                depth: binding.depth + 1,
                access: Arc::new(Embedded {
                    get,
                    get_mut,
                    inner: binding.access,
                }),
            });
        }
        self
    }

    /// Validates the collected bindings.
    ///
    /// A binding shadowed by one at a shallower embedding depth (same wire
    /// key, or a second extras or inline binding) is dropped. The same clash
    /// at equal depth is an error.
    fn finish(self) -> Result<FieldPlan<T>, PlanError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let record = type_name::<T>();

        let slot_of = |b: &Binding<T>| match b.role {
            Role::Normal => b.key.clone(),
            Role::Extras | Role::Inline => format!("{}{}", crate::tag::UNNAMED, b.role.name()),
        };
        let mut shallowest: HashMap<String, usize> = HashMap::new();
        for binding in &self.bindings {
            let depth = shallowest.entry(slot_of(binding)).or_insert(binding.depth);
            *depth = (*depth).min(binding.depth);
        }

        let mut plan = FieldPlan {
            bindings: Vec::with_capacity(self.bindings.len()),
            by_key: HashMap::new(),
            extras: None,
            inline: None,
        };
        for binding in self.bindings {
            let slot = slot_of(&binding);
            if shallowest.get(&slot).is_some_and(|&d| d < binding.depth) {
                continue;
            }
            let index = plan.bindings.len();
            let taken = match binding.role {
                Role::Normal => plan.by_key.insert(binding.key.clone(), index).is_some(),
                Role::Extras => plan.extras.replace(index).is_some(),
                Role::Inline => plan.inline.replace(index).is_some(),
            };
            if taken {
                return Err(match binding.role {
                    Role::Normal => PlanError::DuplicateKey {
                        record,
                        key: binding.key,
                    },
                    role => PlanError::DuplicateRole {
                        record,
                        role: role.name(),
                    },
                });
            }
            plan.bindings.push(binding);
        }
        if plan.inline.is_some() && plan.bindings.len() > 1 {
            return Err(PlanError::InlineWithSiblings { record });
        }
        Ok(plan)
    }
}

/// Validated, immutable bindings of one record type.
pub struct FieldPlan<T> {
    bindings: Vec<Binding<T>>,
    by_key: HashMap<String, usize>,
    extras: Option<usize>,
    inline: Option<usize>,
}

impl<T> FieldPlan<T> {
    /// Bindings in declaration order.
    pub fn bindings(&self) -> &[Binding<T>] {
        &self.bindings
    }

    pub fn binding(&self, key: &str) -> Option<&Binding<T>> {
        self.by_key.get(key).map(|&i| &self.bindings[i])
    }

    pub fn extras(&self) -> Option<&Binding<T>> {
        self.extras.map(|i| &self.bindings[i])
    }

    pub fn inline(&self) -> Option<&Binding<T>> {
        self.inline.map(|i| &self.bindings[i])
    }
}

impl<T> std::fmt::Debug for FieldPlan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.bindings).finish()
    }
}

type Slot<T> = OnceLock<Result<Arc<FieldPlan<T>>, PlanError>>;

static PLANS: LazyLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the cached plan for `T`, building it on first use.
pub fn plan_of<T: Record>() -> Result<Arc<FieldPlan<T>>, PlanError> {
    slot::<T>()?.get_or_init(build::<T>).clone()
}

fn slot<T: Record>() -> Result<Arc<Slot<T>>, PlanError> {
    let id = TypeId::of::<T>();
    let cached = PLANS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned();
    let entry = match cached {
        Some(entry) => entry,
        None => {
            let mut plans = PLANS.write().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                plans
                    .entry(id)
                    .or_insert_with(|| Arc::new(Slot::<T>::new())),
            )
        }
    };
    downcast_slot::<T>(entry)
}

fn downcast_slot<T: Record>(
    entry: Arc<dyn Any + Send + Sync>,
) -> Result<Arc<Slot<T>>, PlanError> {
    entry.downcast::<Slot<T>>().map_err(|_| PlanError::CacheMismatch {
        record: type_name::<T>(),
    })
}

fn build<T: Record>() -> Result<Arc<FieldPlan<T>>, PlanError> {
    let mut builder = PlanBuilder::<T>::new();
    T::describe(&mut builder);
    let plan = builder.finish()?;
    debug!(
        record = type_name::<T>(),
        bindings = plan.bindings.len(),
        extras = plan.extras.is_some(),
        inline = plan.inline.is_some(),
        "built field plan"
    );
    Ok(Arc::new(plan))
}
