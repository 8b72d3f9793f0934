use inflector::Inflector;

use crate::domain::ports::{InflectionPair, Inflections, NameResolver};

/// English inflection rules from the `Inflector` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl NameResolver for EnglishInflector {
    fn inflections(&self, model_name: &str) -> Inflections {
        let singular = model_name.to_snake_case().to_singular();
        let plural = singular.to_plural();

        Inflections {
            filename: InflectionPair {
                singular: singular.clone(),
                plural: plural.clone(),
            },
            property: InflectionPair {
                singular: singular.to_camel_case(),
                plural: plural.to_camel_case(),
            },
            constructor: InflectionPair {
                singular: singular.to_pascal_case(),
                plural: plural.to_pascal_case(),
            },
        }
    }
}
