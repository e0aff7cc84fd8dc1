//! Protobuf messages of the v2fly geosite dataset (`dlc.dat`).
//!
//! Field numbers follow `app/router/routercommon/common.proto` upstream.

/// Domain for routing decision.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Domain {
    /// Domain matching type.
    #[prost(enumeration = "domain::Type", tag = "1")]
    pub r#type: i32,
    /// Domain value.
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
    /// Attributes of this domain. Used to derive `code@attribute` categories.
    #[prost(message, repeated, tag = "3")]
    pub attribute: ::prost::alloc::vec::Vec<domain::Attribute>,
}

/// Nested message and enum types in `Domain`.
pub mod domain {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Attribute {
        #[prost(string, tag = "1")]
        pub key: ::prost::alloc::string::String,
        #[prost(oneof = "attribute::TypedValue", tags = "2, 3")]
        pub typed_value: ::core::option::Option<attribute::TypedValue>,
    }

    /// Nested message and enum types in `Attribute`.
    pub mod attribute {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum TypedValue {
            #[prost(bool, tag = "2")]
            BoolValue(bool),
            #[prost(int64, tag = "3")]
            IntValue(i64),
        }
    }

    /// Type of domain value.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        /// The value is used as is.
        Plain = 0,
        /// The value is used as a regular expression.
        Regex = 1,
        /// The value is a root domain.
        RootDomain = 2,
        /// The value is a domain.
        Full = 3,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GeoSite {
    #[prost(string, tag = "1")]
    pub country_code: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub domain: ::prost::alloc::vec::Vec<Domain>,
    #[prost(bytes = "vec", tag = "3")]
    pub resource_hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "4")]
    pub code: ::prost::alloc::string::String,
    #[prost(string, tag = "68000")]
    pub file_path: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GeoSiteList {
    #[prost(message, repeated, tag = "1")]
    pub entry: ::prost::alloc::vec::Vec<GeoSite>,
}

impl Domain {
    /// Convenience constructor, mostly for building synthetic datasets.
    pub fn new(kind: domain::Type, value: impl Into<String>) -> Self {
        Self {
            r#type: kind as i32,
            value: value.into(),
            attribute: Vec::new(),
        }
    }

    /// Attach a boolean attribute (the form used by domain-list-community).
    pub fn with_attribute(mut self, key: impl Into<String>) -> Self {
        self.attribute.push(domain::Attribute {
            key: key.into(),
            typed_value: Some(domain::attribute::TypedValue::BoolValue(true)),
        });
        self
    }
}

impl GeoSite {
    pub fn new(country_code: impl Into<String>, domain: Vec<Domain>) -> Self {
        Self {
            country_code: country_code.into(),
            domain,
            ..Default::default()
        }
    }
}
