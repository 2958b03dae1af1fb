// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property projection
//!
//! Turns a feature's property bag into one row of typed values, one per
//! output column. The column set is fixed before the first feature is read.

use geojson_mesh_core::{
    AttributeValue, Error as CoreError, FeatureNode, Location, PropertyDeclaration, ValueType,
};
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::attributes::ColumnSpec;
use crate::config::{CoercionPolicy, ReaderConfig, FEATURE_ID_COLUMN};
use crate::error::Result;

#[derive(Debug, Clone)]
enum ColumnSource {
    FeatureId,
    Serialized,
    Declared(PropertyDeclaration),
}

#[derive(Debug, Clone)]
pub struct PropertyProjector {
    schema: Vec<ColumnSpec>,
    sources: Vec<ColumnSource>,
    coercion: CoercionPolicy,
}

impl PropertyProjector {
    /// Fix the column set: feature ids, then the serialized properties
    /// column, then declared properties in declaration order.
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let mut projector = Self {
            schema: Vec::with_capacity(config.feature_properties.len() + 2),
            sources: Vec::with_capacity(config.feature_properties.len() + 2),
            coercion: config.coercion,
        };
        let mut names = FxHashSet::default();

        if config.feature_ids {
            projector.push(&mut names, FEATURE_ID_COLUMN, ValueType::String, ColumnSource::FeatureId)?;
        }
        if config.serialized_properties_array {
            let name = config.serialized_properties_array_name.trim();
            if name.is_empty() {
                return Err(CoreError::InvalidPropertyDeclaration(
                    "serialized properties column needs a name".to_string(),
                )
                .into());
            }
            projector.push(&mut names, name, ValueType::String, ColumnSource::Serialized)?;
        }
        for declaration in config.feature_properties.iter() {
            projector.push(
                &mut names,
                &declaration.name,
                declaration.value_type(),
                ColumnSource::Declared(declaration.clone()),
            )?;
        }

        Ok(projector)
    }

    fn push(
        &mut self,
        names: &mut FxHashSet<String>,
        name: &str,
        ty: ValueType,
        source: ColumnSource,
    ) -> Result<()> {
        if !names.insert(name.to_string()) {
            return Err(CoreError::InvalidPropertyDeclaration(format!(
                "column {:?} is declared twice",
                name
            ))
            .into());
        }
        self.schema.push(ColumnSpec::new(name, ty));
        self.sources.push(source);
        Ok(())
    }

    pub fn schema(&self) -> &[ColumnSpec] {
        &self.schema
    }

    /// Project one feature onto the schema
    pub fn project(&self, feature: &FeatureNode<'_>) -> Result<Vec<AttributeValue>> {
        self.sources
            .iter()
            .map(|source| match source {
                ColumnSource::FeatureId => Ok(AttributeValue::String(feature.id_string())),
                ColumnSource::Serialized => Ok(AttributeValue::String(feature.serialized_properties())),
                ColumnSource::Declared(declaration) => self.declared(feature, declaration),
            })
            .collect()
    }

    fn declared(&self, feature: &FeatureNode<'_>, declaration: &PropertyDeclaration) -> Result<AttributeValue> {
        let value = match feature.property(&declaration.name) {
            None | Some(Value::Null) => return Ok(declaration.default.clone()),
            Some(value) => value,
        };

        let ty = declaration.value_type();
        if let Some(coerced) = AttributeValue::coerce(value, ty) {
            return Ok(coerced);
        }

        match self.coercion {
            CoercionPolicy::Strict => Err(CoreError::TypeCoercionFailure {
                property: declaration.name.clone(),
                expected: ty.name(),
                location: Location::Feature { index: feature.index },
            }
            .into()),
            CoercionPolicy::FallbackToDefault => {
                tracing::warn!(
                    feature = feature.index,
                    property = %declaration.name,
                    expected = ty.name(),
                    found = %value,
                    "Property value replaced by its default"
                );
                Ok(declaration.default.clone())
            }
        }
    }
}
