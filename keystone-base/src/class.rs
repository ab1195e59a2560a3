//! Type descriptors and the `extend` inheritance mechanism
//!
//! A [`TypeDescriptor`] is a named template describing static and instance
//! behavior for objects created from it. New descriptors are built from a
//! parent with [`TypeDescriptor::extend`] or
//! [`TypeDescriptor::extend_with_statics`]; member lookup walks the parent
//! chain, so a subtype inherits everything it does not explicitly override.
//!
//! A descriptor is a cheap cloneable handle over immutable shared data -
//! there is no mutable shared prototype. Building a chain never runs any
//! constructor; construction side effects only happen in
//! [`TypeDescriptor::construct`].
//!
//! # Example
//! ```
//! use keystone_base::class::{Members, TypeDescriptor};
//! use serde_json::json;
//!
//! let animal = TypeDescriptor::base()
//!     .extend(
//!         "Animal",
//!         Members::new()
//!             .value("legs", json!(4))
//!             .method("describe", |inst, _args| {
//!                 Ok(json!(format!("an {}", inst.descriptor().name())))
//!             }),
//!     )
//!     .unwrap();
//!
//! let mut instance = animal.construct(&[]).unwrap();
//! assert_eq!(instance.call("describe", &[]).unwrap(), json!("an Animal"));
//! ```

use crate::types::{KeystoneError, Result, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An instance method: invoked with the instance as explicit receiver
pub type Method = Arc<dyn Fn(&mut Instance, &[Value]) -> Result<Value> + Send + Sync>;

/// A constructor: initializes a freshly created instance from arguments
pub type Constructor = Arc<dyn Fn(&mut Instance, &[Value]) -> Result<()> + Send + Sync>;

/// A single member of a type: either a plain value or a method
#[derive(Clone)]
pub enum Member {
    /// A data member, copied to any member set that inherits it
    Value(Value),
    /// A callable member
    Method(Method),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Value(v) => write!(f, "Value({})", v),
            Member::Method(_) => write!(f, "Method(..)"),
        }
    }
}

/// A set of members passed to `extend`
///
/// Built fluently:
///
/// ```
/// use keystone_base::class::Members;
/// use serde_json::json;
///
/// let members = Members::new()
///     .value("max_speed", json!(120))
///     .method("honk", |_inst, _args| Ok(json!("beep")));
/// assert_eq!(members.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct Members {
    entries: HashMap<String, Member>,
    constructor: Option<Constructor>,
}

impl Members {
    /// Create an empty member set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a data member
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), Member::Value(value.into()));
        self
    }

    /// Builder method: add a method member
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Member::Method(Arc::new(f)));
        self
    }

    /// Builder method: supply an explicit constructor
    ///
    /// Without one, construction forwards all arguments to the parent's
    /// construction behavior.
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> Result<()> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(f));
        self
    }

    /// Build a member set of data members from a JSON object
    ///
    /// Fails fast with [`KeystoneError::InvalidArgument`] if `value` is not a
    /// JSON object or if any key is blank.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => {
                let mut members = Members::new();
                for (name, value) in map {
                    if name.trim().is_empty() {
                        return Err(KeystoneError::InvalidArgument(
                            "member name is empty".to_string(),
                        ));
                    }
                    members.entries.insert(name, Member::Value(value));
                }
                Ok(members)
            }
            other => Err(KeystoneError::InvalidArgument(format!(
                "member set must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Get a member by name
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.entries.get(name)
    }

    /// Number of members in this set (excluding the constructor)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if this set has no members and no constructor
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.constructor.is_none()
    }

    /// Check that every member name is usable
    fn validate(&self) -> Result<()> {
        for name in self.entries.keys() {
            if name.trim().is_empty() {
                return Err(KeystoneError::InvalidArgument(
                    "member name is empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Members {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Members")
            .field("entries", &self.entries)
            .field("has_constructor", &self.constructor.is_some())
            .finish()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Immutable data behind a [`TypeDescriptor`] handle
struct TypeData {
    /// Type name, used for registration and diagnostics
    name: String,
    /// Parent descriptor (None only for the root)
    parent: Option<TypeDescriptor>,
    /// Flattened static members (inherited + own)
    statics: HashMap<String, Member>,
    /// Own instance members; lookup falls back to the parent chain
    members: HashMap<String, Member>,
    /// Explicit constructor, if the member set defined one
    constructor: Option<Constructor>,
}

/// A named type template with static members, instance members, and a parent
///
/// Every descriptor except the root has exactly one parent. Instance member
/// lookup delegates to the parent chain; static members are flattened at
/// `extend` time (parent statics shallow-copied, then overlaid by the
/// supplied set, so explicit values win).
///
/// Cloning a descriptor clones a handle to the same immutable type data.
#[derive(Clone)]
pub struct TypeDescriptor {
    data: Arc<TypeData>,
}

impl TypeDescriptor {
    /// The root descriptor: no parent, no members, no-op construction
    pub fn base() -> TypeDescriptor {
        TypeDescriptor {
            data: Arc::new(TypeData {
                name: "Base".to_string(),
                parent: None,
                statics: HashMap::new(),
                members: HashMap::new(),
                constructor: None,
            }),
        }
    }

    /// Derive a new type with instance members only
    ///
    /// This is the single-argument form of `extend`: the supplied set is
    /// treated as instance members and no static members are added.
    pub fn extend(&self, name: impl Into<String>, members: Members) -> Result<TypeDescriptor> {
        self.extend_with_statics(name, Members::new(), members)
    }

    /// Derive a new type with static and instance members
    ///
    /// The new type inherits the parent's statics (overlaid by `statics`) and
    /// delegates instance lookup to the parent chain for anything `members`
    /// does not override.
    ///
    /// # Errors
    /// [`KeystoneError::InvalidArgument`] if the type name or any member name
    /// is blank, or if the static set defines a constructor.
    pub fn extend_with_statics(
        &self,
        name: impl Into<String>,
        statics: Members,
        members: Members,
    ) -> Result<TypeDescriptor> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(KeystoneError::InvalidArgument(
                "type name is empty".to_string(),
            ));
        }
        statics.validate()?;
        members.validate()?;
        if statics.constructor.is_some() {
            return Err(KeystoneError::InvalidArgument(
                "static member set cannot define a constructor".to_string(),
            ));
        }

        // Parent statics first, then the supplied set, so explicit values win
        let mut merged_statics = self.data.statics.clone();
        merged_statics.extend(statics.entries);

        Ok(TypeDescriptor {
            data: Arc::new(TypeData {
                name,
                parent: Some(self.clone()),
                statics: merged_statics,
                members: members.entries,
                constructor: members.constructor,
            }),
        })
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Parent descriptor, the stable reference used for explicit super-calls
    pub fn parent(&self) -> Option<&TypeDescriptor> {
        self.data.parent.as_ref()
    }

    /// True if `other` is a handle to the same type
    pub fn same_type(&self, other: &TypeDescriptor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Resolve an instance member along the parent chain
    pub fn resolve(&self, name: &str) -> Option<&Member> {
        self.data
            .members
            .get(name)
            .or_else(|| self.data.parent.as_ref().and_then(|p| p.resolve(name)))
    }

    /// Resolve a static member (own or inherited)
    pub fn resolve_static(&self, name: &str) -> Option<&Member> {
        self.data.statics.get(name)
    }

    /// True if instances of this type respond to `name`
    pub fn has_member(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Create an instance of this type
    ///
    /// Runs the effective constructor: this type's explicit constructor if it
    /// has one, otherwise the nearest ancestor's, with all arguments
    /// forwarded. The root's construction is a no-op.
    pub fn construct(&self, args: &[Value]) -> Result<Instance> {
        let mut instance = Instance {
            descriptor: self.clone(),
            fields: HashMap::new(),
        };
        self.run_constructor(&mut instance, args)?;
        Ok(instance)
    }

    /// Invoke the parent's construction behavior on an instance
    ///
    /// Intended for explicit constructors that want super-initialization
    /// before (or after) their own.
    pub fn construct_parent(&self, instance: &mut Instance, args: &[Value]) -> Result<()> {
        match &self.data.parent {
            Some(parent) => parent.run_constructor(instance, args),
            None => Ok(()),
        }
    }

    fn run_constructor(&self, instance: &mut Instance, args: &[Value]) -> Result<()> {
        match &self.data.constructor {
            Some(ctor) => ctor(instance, args),
            // Default: forward all arguments to the parent's construction
            None => self.construct_parent(instance, args),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.data.name)
            .field("parent", &self.data.parent.as_ref().map(|p| p.name()))
            .field("statics", &self.data.statics.len())
            .field("members", &self.data.members.len())
            .finish()
    }
}

/// An object created from a [`TypeDescriptor`]
///
/// Carries its descriptor plus a field map for per-instance state set by
/// constructors and methods. Methods receive the instance as an explicit
/// receiver rather than an implicit bound `this`.
pub struct Instance {
    descriptor: TypeDescriptor,
    fields: HashMap<String, Value>,
}

impl Instance {
    /// The descriptor this instance was created from
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Set a field on this instance
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field from this instance
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// True if this instance responds to `name` (own type or any ancestor)
    pub fn responds_to(&self, name: &str) -> bool {
        self.descriptor.has_member(name)
    }

    /// Call a method by name, resolving along the parent chain
    ///
    /// # Errors
    /// [`KeystoneError::MemberNotFound`] if no ancestor defines the member,
    /// [`KeystoneError::NotCallable`] if it resolves to a data member.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let method = match self.descriptor.resolve(name) {
            Some(Member::Method(m)) => m.clone(),
            Some(Member::Value(_)) => return Err(KeystoneError::NotCallable(name.to_string())),
            None => return Err(KeystoneError::MemberNotFound(name.to_string())),
        };
        method(self, args)
    }

    /// Call a method resolved from the parent surface, skipping own overrides
    ///
    /// Resolution starts at the instance's type's parent, so an override can
    /// reach the implementation it shadowed. Nested super-calls restart at
    /// that same parent; single-level super access is the supported contract.
    pub fn call_super(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let parent = match self.descriptor.parent() {
            Some(parent) => parent.clone(),
            None => return Err(KeystoneError::MemberNotFound(name.to_string())),
        };
        let method = match parent.resolve(name) {
            Some(Member::Method(m)) => m.clone(),
            Some(Member::Value(_)) => return Err(KeystoneError::NotCallable(name.to_string())),
            None => return Err(KeystoneError::MemberNotFound(name.to_string())),
        };
        method(self, args)
    }

    /// Read a data member, checking instance fields first, then the chain
    pub fn member_value(&self, name: &str) -> Option<Value> {
        if let Some(field) = self.fields.get(name) {
            return Some(field.clone());
        }
        match self.descriptor.resolve(name) {
            Some(Member::Value(v)) => Some(v.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.descriptor.name())
            .field("fields", &self.fields)
            .finish()
    }
}
