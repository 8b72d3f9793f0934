use std::sync::Arc;

use crate::domain::ports::{Inflections, NameResolver};

/// Wire naming of the REST adapter on top of a `NameResolver`.
///
/// "person" always pluralizes to "people", whatever the resolver says, for
/// URL segments and wire properties alike.
#[derive(Clone)]
pub struct ResourceNaming {
    resolver: Arc<dyn NameResolver>,
    camelize: bool,
}

impl ResourceNaming {
    pub fn new(resolver: Arc<dyn NameResolver>, camelize: bool) -> Self {
        Self { resolver, camelize }
    }

    pub fn inflections(&self, model_name: &str) -> Inflections {
        let mut inflections = self.resolver.inflections(model_name);
        if inflections.filename.singular == "person" {
            inflections.filename.plural = "people".to_string();
        }
        if inflections.property.singular == "person" {
            inflections.property.plural = "people".to_string();
        }
        if inflections.constructor.singular == "Person" {
            inflections.constructor.plural = "People".to_string();
        }
        inflections
    }

    /// Collection path, e.g. `users` or `blog_posts`.
    pub fn resource_path(&self, model_name: &str) -> String {
        self.inflections(model_name).filename.plural
    }

    /// Property wrapping a serialized instance in request bodies.
    pub fn field_name(&self, model_name: &str) -> String {
        let inflections = self.inflections(model_name);
        if self.camelize {
            inflections.property.singular
        } else {
            inflections.filename.singular
        }
    }
}
