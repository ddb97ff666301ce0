//! Name-keyed store of compiled schemas, used to resolve sub-parser
//! references (`spec.md` glossary: "its own schema is compiled
//! independently"). An ordinary value the caller owns and threads
//! through calls — no global/`lazy_static` state, per `SPEC_FULL.md` §5.
use std::collections::HashMap;

use crate::schema::ir::CompiledSchema;

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, CompiledSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Registers a compiled schema under its own name, replacing any
    /// prior schema of the same name.
    pub fn register(&mut self, schema: CompiledSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&CompiledSchema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::compile::compile;

    #[test]
    fn register_then_resolve() {
        let mut reg = SchemaRegistry::new();
        let inner = compile("inner", "param u16 n; u8: v[n]", &reg).unwrap();
        reg.register(inner);
        assert!(reg.contains("inner"));
        assert!(!reg.contains("missing"));
    }
}
