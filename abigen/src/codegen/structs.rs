/* Tuple struct synthesis
 *
 * Every distinct tuple shape referenced by any contract of the unit gets
 * exactly one named struct. Nested tuples are registered before the tuple
 * containing them, so a struct's field types always resolve against the
 * table built so far. */

use crate::codegen::helpers::{assign_names, struct_name_from_internal};
use crate::codegen::types::{map_type, shape_key};
use crate::error::Result;
use crate::model::{FieldSpec, StructSpec, StructTable};
use abigen_types::{Abi, AbiType, Param};
use std::collections::BTreeSet;
use tracing::debug;

/* Build the struct table for a unit.
 *
 * `abis` must be given in contract-name order; declarations are walked in
 * ABI order (constructor, functions with inputs before outputs, events).
 * `reserved` holds type names the synthesized structs must avoid. */
pub fn synthesize<'a>(
    abis: impl IntoIterator<Item = &'a Abi>,
    reserved: &BTreeSet<String>,
) -> Result<StructTable> {
    let mut synthesizer = Synthesizer {
        table: StructTable::new(),
        used: reserved.clone(),
    };

    for abi in abis {
        if let Some(constructor) = &abi.constructor {
            synthesizer.visit_params(&constructor.inputs)?;
        }
        for function in &abi.functions {
            synthesizer.visit_params(&function.inputs)?;
            synthesizer.visit_params(&function.outputs)?;
        }
        for event in &abi.events {
            synthesizer.visit_params(&event.inputs)?;
        }
    }

    debug!(count = synthesizer.table.len(), "synthesized tuple structs");
    Ok(synthesizer.table)
}

struct Synthesizer {
    table: StructTable,
    used: BTreeSet<String>,
}

impl Synthesizer {
    fn visit_params(&mut self, params: &[Param]) -> Result<()> {
        for param in params {
            self.visit(&param.ty, param.internal_type.as_deref())?;
        }
        Ok(())
    }

    fn visit(&mut self, ty: &AbiType, internal_type: Option<&str>) -> Result<()> {
        match ty {
            AbiType::Array(inner, _) | AbiType::Slice(inner) => self.visit(inner, internal_type),
            AbiType::Tuple(components) => {
                self.visit_params(components)?;

                let shape = shape_key(components);
                if self.table.contains_key(&shape) {
                    return Ok(());
                }

                let base = internal_type
                    .and_then(struct_name_from_internal)
                    .unwrap_or_else(|| format!("Struct{}", self.table.len()));
                let name = self.claim(base);

                let names = assign_names(components, "field", &mut BTreeSet::new());
                let mut fields = Vec::with_capacity(components.len());
                for (component, field_name) in components.iter().zip(names) {
                    fields.push(FieldSpec {
                        ty: map_type(&component.ty, &self.table)?,
                        name: field_name,
                        sol_kind: component.ty.clone(),
                    });
                }

                self.table.insert(shape, StructSpec { name, fields });
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /* `base`, else `base1`, `base2`, ... */
    fn claim(&mut self, base: String) -> String {
        let name = if self.used.contains(&base) {
            (1..)
                .map(|n| format!("{}{}", base, n))
                .find(|candidate| !self.used.contains(candidate))
                .unwrap_or_else(|| base.clone())
        } else {
            base
        };
        self.used.insert(name.clone());
        name
    }
}
