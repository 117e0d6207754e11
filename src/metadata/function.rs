//! Functions and their parameters.
//!
//! A function's identity embeds its parameter type signature, so overloads of
//! one name coexist in a model's function collection.

use std::sync::{Arc, RwLock};

use crate::{
    metadata::{
        collection::{MetadataCollection, NamedItem, ReadOnlyMetadataCollection},
        flags::{DataSpace, ParameterMode},
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        typeusage::TypeUsage,
    },
    Result,
};

/// One parameter of a function. The direction is a sticky field: assigned at
/// construction, immutable afterwards.
#[derive(Debug)]
pub struct FunctionParameter {
    base: ItemBase,
    name: String,
    type_usage: Arc<TypeUsage>,
    position: RwLock<Option<usize>>,
}

impl FunctionParameter {
    /// Declare a parameter with the given direction.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, type_usage: Arc<TypeUsage>, mode: ParameterMode) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("function parameter name must not be empty"));
        }
        let parameter = Arc::new(FunctionParameter {
            base: ItemBase::new(),
            name: name.to_string(),
            type_usage,
            position: RwLock::new(None),
        });
        parameter.base.state().set_parameter_mode(mode, name)?;
        Ok(parameter)
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured parameter type.
    #[must_use]
    pub fn type_usage(&self) -> &Arc<TypeUsage> {
        &self.type_usage
    }

    /// The parameter direction.
    #[must_use]
    pub fn mode(&self) -> Option<ParameterMode> {
        self.base.state().parameter_mode()
    }

    /// Zero-based position within the declaring function, once added.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        *read_lock!(self.position)
    }

    pub(crate) fn set_position(&self, position: usize) {
        *write_lock!(self.position) = Some(position);
    }
}

impl MetadataItem for FunctionParameter {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::FunctionParameter
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.type_usage.as_ref().set_readonly();
    }
}

impl NamedItem for Arc<FunctionParameter> {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

/// A named function: ordered parameters plus an optional return usage.
#[derive(Debug)]
pub struct EdmFunction {
    base: ItemBase,
    name: String,
    namespace: String,
    parameters: Arc<MetadataCollection<Arc<FunctionParameter>>>,
    return_usage: RwLock<Option<Arc<TypeUsage>>>,
}

impl EdmFunction {
    /// Declare a function in `namespace` tagged with `space`.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, namespace: &str, space: DataSpace) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("function name must not be empty"));
        }
        let function = Arc::new(EdmFunction {
            base: ItemBase::new(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            parameters: Arc::new(MetadataCollection::new()),
            return_usage: RwLock::new(None),
        });
        function
            .base
            .state()
            .set_data_space(space, &function.full_name())?;
        Ok(function)
    }

    /// The simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaring namespace.
    #[must_use]
    pub fn namespace_name(&self) -> &str {
        &self.namespace
    }

    /// `Namespace.Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// The parameters, in declaration order.
    #[must_use]
    pub fn parameters(&self) -> ReadOnlyMetadataCollection<Arc<FunctionParameter>> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.parameters))
    }

    /// Append a parameter; its position is fixed by the addition order.
    ///
    /// # Errors
    ///
    /// Fails when frozen or on a duplicate parameter name.
    pub fn add_parameter(&self, parameter: Arc<FunctionParameter>) -> Result<()> {
        self.base.state().assert_mutable(&self.full_name())?;
        let position = self.parameters.len();
        self.parameters.add(Arc::clone(&parameter))?;
        parameter.set_position(position);
        Ok(())
    }

    /// The declared return usage, if any.
    #[must_use]
    pub fn return_usage(&self) -> Option<Arc<TypeUsage>> {
        read_lock!(self.return_usage).clone()
    }

    /// Declare the return usage.
    ///
    /// # Errors
    ///
    /// Fails when frozen.
    pub fn set_return_usage(&self, usage: Arc<TypeUsage>) -> Result<()> {
        self.base.state().assert_mutable(&self.full_name())?;
        *write_lock!(self.return_usage) = Some(usage);
        Ok(())
    }
}

impl MetadataItem for EdmFunction {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EdmFunction
    }

    /// The full name with the parameter type signature appended, making
    /// overloads distinct.
    fn identity(&self) -> String {
        let signature: Vec<String> = self
            .parameters
            .to_vec()
            .iter()
            .map(|parameter| parameter.type_usage().edm_type().identity())
            .collect();
        format!("{0}({1})", self.full_name(), signature.join(","))
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.parameters.set_readonly();
        for parameter in self.parameters.to_vec() {
            parameter.as_ref().set_readonly();
        }
        if let Some(usage) = self.return_usage() {
            usage.as_ref().set_readonly();
        }
    }
}

impl NamedItem for Arc<EdmFunction> {
    fn identity(&self) -> String {
        MetadataItem::identity(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::{EdmTypeRef, PrimitiveType, PrimitiveTypeKind};

    fn usage(kind: PrimitiveTypeKind) -> Arc<TypeUsage> {
        TypeUsage::default_of(EdmTypeRef::Primitive(PrimitiveType::canonical(kind))).unwrap()
    }

    #[test]
    fn test_parameter_positions_follow_addition_order() {
        let function = EdmFunction::new("Total", "Shop", DataSpace::CSpace).unwrap();
        let first =
            FunctionParameter::new("orderId", usage(PrimitiveTypeKind::Int32), ParameterMode::In)
                .unwrap();
        let second = FunctionParameter::new(
            "includeTax",
            usage(PrimitiveTypeKind::Boolean),
            ParameterMode::In,
        )
        .unwrap();
        function.add_parameter(Arc::clone(&first)).unwrap();
        function.add_parameter(Arc::clone(&second)).unwrap();
        assert_eq!(first.position(), Some(0));
        assert_eq!(second.position(), Some(1));
        assert_eq!(first.mode(), Some(ParameterMode::In));
    }

    #[test]
    fn test_overloads_have_distinct_identities() {
        let by_id = EdmFunction::new("Find", "Shop", DataSpace::CSpace).unwrap();
        by_id
            .add_parameter(
                FunctionParameter::new("id", usage(PrimitiveTypeKind::Int32), ParameterMode::In)
                    .unwrap(),
            )
            .unwrap();
        let by_name = EdmFunction::new("Find", "Shop", DataSpace::CSpace).unwrap();
        by_name
            .add_parameter(
                FunctionParameter::new(
                    "name",
                    usage(PrimitiveTypeKind::String),
                    ParameterMode::In,
                )
                .unwrap(),
            )
            .unwrap();
        assert_ne!(
            MetadataItem::identity(by_id.as_ref()),
            MetadataItem::identity(by_name.as_ref())
        );
    }

    #[test]
    fn test_freeze_locks_signature() {
        let function = EdmFunction::new("Now", "Shop", DataSpace::CSpace).unwrap();
        function
            .set_return_usage(usage(PrimitiveTypeKind::DateTime))
            .unwrap();
        function.as_ref().set_readonly();
        assert!(function
            .add_parameter(
                FunctionParameter::new("x", usage(PrimitiveTypeKind::Int32), ParameterMode::In)
                    .unwrap()
            )
            .is_err());
        assert!(function.return_usage().unwrap().as_ref().is_readonly());
    }
}
