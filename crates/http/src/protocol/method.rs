//! Request method handling.
//!
//! The dispatch layer only distinguishes the seven methods a route can be
//! registered for. Every other token the transport hands over collapses into
//! [`HttpMethod::Other`], which no route table entry can ever accept unless it
//! was registered with [`MethodSet::all`].

use std::fmt;

use http::Method;

/// The closed set of request methods understood by the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// Any method token that has no dedicated variant (CONNECT, TRACE, extension methods)
    Other,
}

impl HttpMethod {
    /// All variants, in declaration order
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Other,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other => "OTHER",
        }
    }
}

impl From<&Method> for HttpMethod {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => HttpMethod::Get,
            Method::POST => HttpMethod::Post,
            Method::PUT => HttpMethod::Put,
            Method::PATCH => HttpMethod::Patch,
            Method::DELETE => HttpMethod::Delete,
            Method::HEAD => HttpMethod::Head,
            Method::OPTIONS => HttpMethod::Options,
            _ => HttpMethod::Other,
        }
    }
}

impl From<Method> for HttpMethod {
    #[inline]
    fn from(method: Method) -> Self {
        HttpMethod::from(&method)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`HttpMethod`]s, stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodSet(u8);

impl MethodSet {
    /// Creates an empty set
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates a set containing every method, `Other` included
    #[inline]
    pub const fn all() -> Self {
        Self(u8::MAX)
    }

    /// Returns a copy of this set with `method` added
    #[inline]
    #[must_use]
    pub const fn with(self, method: HttpMethod) -> Self {
        Self(self.0 | method.bit())
    }

    #[inline]
    pub fn insert(&mut self, method: HttpMethod) {
        self.0 |= method.bit();
    }

    #[inline]
    pub fn contains(&self, method: HttpMethod) -> bool {
        self.0 & method.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained methods in declaration order
    pub fn iter(&self) -> impl Iterator<Item = HttpMethod> + '_ {
        HttpMethod::ALL.into_iter().filter(|method| self.contains(*method))
    }
}

impl From<HttpMethod> for MethodSet {
    #[inline]
    fn from(method: HttpMethod) -> Self {
        MethodSet::empty().with(method)
    }
}

impl<const N: usize> From<[HttpMethod; N]> for MethodSet {
    fn from(methods: [HttpMethod; N]) -> Self {
        methods.into_iter().collect()
    }
}

impl FromIterator<HttpMethod> for MethodSet {
    fn from_iter<T: IntoIterator<Item = HttpMethod>>(iter: T) -> Self {
        let mut set = MethodSet::empty();
        for method in iter {
            set.insert(method);
        }
        set
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for method in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(method.as_str())?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_methods() {
        assert_eq!(HttpMethod::from(&Method::GET), HttpMethod::Get);
        assert_eq!(HttpMethod::from(&Method::PATCH), HttpMethod::Patch);
        assert_eq!(HttpMethod::from(Method::OPTIONS), HttpMethod::Options);
    }

    #[test]
    fn test_unmapped_methods_become_other() {
        assert_eq!(HttpMethod::from(&Method::CONNECT), HttpMethod::Other);
        assert_eq!(HttpMethod::from(&Method::TRACE), HttpMethod::Other);

        let purge = Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(HttpMethod::from(&purge), HttpMethod::Other);
    }

    #[test]
    fn test_method_set() {
        let set = MethodSet::from([HttpMethod::Get, HttpMethod::Head]);
        assert!(set.contains(HttpMethod::Get));
        assert!(set.contains(HttpMethod::Head));
        assert!(!set.contains(HttpMethod::Post));
        assert!(!set.contains(HttpMethod::Other));
        assert_eq!(set.to_string(), "GET,HEAD");

        assert!(MethodSet::empty().is_empty());
        assert!(MethodSet::all().contains(HttpMethod::Other));
    }
}
