//! Schemas for providers and data sources
//!
//! A schema is a root block of attributes plus repeatable nested blocks.
//! Build them with [`SchemaBuilder`] and [`AttributeBuilder`].

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    /// Ordered, duplicates allowed
    List(Box<AttributeType>),
    /// String keys only
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    pub fn list_of(inner: AttributeType) -> Self {
        AttributeType::List(Box::new(inner))
    }

    pub fn map_of(inner: AttributeType) -> Self {
        AttributeType::Map(Box::new(inner))
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeType)>,
        K: Into<String>,
    {
        AttributeType::Object(fields.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    /// Bumped whenever the state layout changes
    pub version: i64,
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, type_name: &str) -> Option<&NestedBlock> {
        self.block
            .block_types
            .iter()
            .find(|b| b.type_name == type_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
}

/// Block that may appear any number of times inside its parent
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    List,
    /// Order carries no meaning
    Set,
}

pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    /// Required and optional are mutually exclusive; the last call wins
    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Redacted from plan output
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    version: i64,
    block: Block,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.block.attributes.push(attr);
        self
    }

    pub fn attributes(mut self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        self.block.attributes.extend(attrs);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.block.block_types.push(block);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            block: self.block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_then_optional_leaves_optional() {
        let attr = AttributeBuilder::new("db_home_id", AttributeType::String)
            .required()
            .optional()
            .build();

        assert!(attr.optional);
        assert!(!attr.required);
    }

    #[test]
    fn schema_lookup_by_name() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Databases in a compartment")
            .attribute(
                AttributeBuilder::new("compartment_id", AttributeType::String)
                    .description("The compartment OCID")
                    .required()
                    .build(),
            )
            .attributes([AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .build()])
            .block(NestedBlock {
                type_name: "filter".to_string(),
                block: Block::new(),
                nesting: NestingMode::Set,
            })
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.description, "Databases in a compartment");
        assert_eq!(
            schema.attribute("compartment_id").unwrap().description,
            "The compartment OCID"
        );
        assert!(schema.attribute("id").unwrap().computed);
        assert!(schema.attribute("missing").is_none());
        assert!(schema.nested_block("filter").is_some());
        assert!(schema.nested_block("other").is_none());
    }

    #[test]
    fn connection_strings_type_is_a_list_of_objects() {
        let item = AttributeType::object([
            ("cdb_default", AttributeType::String),
            (
                "all_connection_strings",
                AttributeType::map_of(AttributeType::String),
            ),
        ]);

        let AttributeType::List(inner) = AttributeType::list_of(item) else {
            panic!("expected a list");
        };
        let AttributeType::Object(fields) = inner.as_ref() else {
            panic!("expected an object, got {:?}", inner);
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(
            fields.get("all_connection_strings"),
            Some(&AttributeType::map_of(AttributeType::String))
        );
    }
}
