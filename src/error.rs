use thiserror::Error;

macro_rules! usage_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidArgument {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidArgument {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all usage and contract
/// errors this library can potentially return.
///
/// These represent programmer error by a collaborator building or querying the
/// metadata graph, and they surface immediately at the call site. Schema-level
/// findings discovered by the validator travel through
/// [`crate::metadata::validation::DataModelError`] records instead and are
/// never thrown, unless a caller explicitly opts into
/// [`Error::ValidationFailed`] via
/// [`crate::metadata::validation::DataModelValidator::validate_or_fail`].
///
/// # Error Categories
///
/// ## Lifecycle Errors
/// - [`Error::ReadOnly`] - Mutation attempted on a frozen item or collection
/// - [`Error::StateConflict`] - Sticky flag field re-assigned with a different value
///
/// ## Collection Errors
/// - [`Error::DuplicateIdentity`] - Two items with the same identity added to one collection
/// - [`Error::ItemNotFound`] - Lookup of a required identity failed
/// - [`Error::MoreThanOneMatch`] - Case-insensitive lookup matched several case variants
///
/// ## Construction Errors
/// - [`Error::InvalidArgument`] - Null/empty/ill-shaped argument at a constructor or setter
/// - [`Error::KeyOnDerivedType`] - Key member declared on a type whose base already has keys
///
/// ## Validation Opt-In
/// - [`Error::ValidationFailed`] - Accumulated non-warning validator findings, on request
#[derive(Error, Debug)]
pub enum Error {
    /// Mutation was attempted on an item or collection that is already frozen.
    ///
    /// The read-only transition is one-way and terminal; once `set_readonly`
    /// has completed on an item, every subsequent mutating call fails with
    /// this error before any partial mutation takes effect.
    #[error("The metadata item '{identity}' is read-only and cannot be modified")]
    ReadOnly {
        /// Identity of the frozen item
        identity: String,
    },

    /// A sticky state field was re-assigned with a conflicting value.
    ///
    /// Data space and parameter mode are set-once fields: re-setting them to
    /// an equal value is a no-op, while a different value is rejected.
    #[error("Conflicting state assignment - {0}")]
    StateConflict(String),

    /// An item with the same identity already exists in the collection.
    ///
    /// Identity comparison is ordinal (case-sensitive); items that differ
    /// only by case are distinct and do not collide.
    #[error("An item with identity '{identity}' already exists in the collection")]
    DuplicateIdentity {
        /// Identity of the colliding item
        identity: String,
    },

    /// No item with the requested identity exists in the collection.
    #[error("An item with identity '{identity}' was not found")]
    ItemNotFound {
        /// Identity that failed to resolve
        identity: String,
    },

    /// A case-insensitive lookup matched more than one case variant.
    ///
    /// Multiple items can legally differ only by case; the exact-case path is
    /// authoritative and the fallback refuses to pick one silently.
    #[error("More than one item matches identity '{identity}' ignoring case")]
    MoreThanOneMatch {
        /// Identity that matched ambiguously
        identity: String,
    },

    /// A required argument was empty, out of range, or otherwise ill-shaped.
    ///
    /// Raised at construction and at every setter until the item is frozen.
    /// The error includes the source location where the violation was
    /// detected for debugging purposes.
    #[error("Invalid argument - {file}:{line}: {message}")]
    InvalidArgument {
        /// Description of the violated expectation
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A key member was declared on a type whose base type already has keys.
    ///
    /// Key members are inherited from the nearest base type that declares
    /// them; a type and its base must not both define keys.
    #[error("Type '{type_name}' cannot declare key members because a base type already declares them")]
    KeyOnDerivedType {
        /// Full name of the offending derived type
        type_name: String,
    },

    /// A member of an illegal kind was added to a structural type.
    ///
    /// Each structural type constrains which member kinds are legal, e.g. a
    /// complex type accepts properties but not association ends.
    #[error("Member '{member}' of kind {kind} is not valid on type '{type_name}'")]
    InvalidMemberKind {
        /// Name of the rejected member
        member: String,
        /// Kind of the rejected member
        kind: String,
        /// Full name of the declaring type
        type_name: String,
    },

    /// A non-owning back-reference could not be resolved.
    ///
    /// Occurs when a weak link (declaring type, entity container, navigation
    /// relationship) is read after its target was dropped, which indicates
    /// the graph was torn down while still in use.
    #[error("Dangling metadata reference - {0}")]
    DanglingReference(String),

    /// The validator found errors and the caller requested throw-on-error.
    ///
    /// All accumulated non-warning findings are combined into the message;
    /// warnings never trigger this error.
    #[error("Schema validation failed with {failures} error(s): {message}")]
    ValidationFailed {
        /// Number of non-warning findings
        failures: usize,
        /// Combined finding messages
        message: String,
    },
}

/// Result type-alias, to simplify the usage within the crate and for the users of the crate
pub type Result<T> = std::result::Result<T, Error>;
