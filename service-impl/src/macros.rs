/// Generates a `Deps` trait (one associated type per dependency, plus the
/// shared `Context`/`Transaction` associated types) and a struct holding an
/// `Arc` of each dependency. Lets every orchestrating service receive its
/// collaborators purely by dependency injection - no service ever imports
/// another's mutable state directly (spec §9).
#[macro_export]
macro_rules! gen_service_impl {
    (
        struct $service_name:ident : $trait:path = $dependencies:ident {
            $($field_name:ident: $field_type:path = $field_attr:ident),* $(,)?
        }
    ) => {
        pub trait $dependencies {
            type Transaction: dao::Transaction + Send + Sync + Clone + std::fmt::Debug + 'static;
            $(
                type $field_name: $field_type + Sync + Send;
            )*
        }

        pub struct $service_name<Deps: $dependencies> {
            $(
                pub $field_attr: std::sync::Arc<Deps::$field_name>,
            )*
        }
    };

    (
        struct $service_name:ident : $trait:path = $dependencies:ident {
            $($field_name:ident: $field_type:path = $field_attr:ident),* $(,)?
        }
        ; custom_fields {
            $($custom_name:ident: $custom_type:ty = $custom_attr:ident),* $(,)?
        }
    ) => {
        pub trait $dependencies {
            type Transaction: dao::Transaction + Send + Sync + Clone + std::fmt::Debug + 'static;
            $(
                type $field_name: $field_type + Sync + Send;
            )*
        }

        pub struct $service_name<Deps: $dependencies> {
            $(
                pub $field_attr: std::sync::Arc<Deps::$field_name>,
            )*
            $(
                pub $custom_attr: $custom_type,
            )*
        }
    };
}
