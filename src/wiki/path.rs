//! Breadcrumb paths of page ids, as found in `/page/0/3/7`

use std::{fmt, num::ParseIntError, str::FromStr};

/// Non-empty list of page ids, the last one being the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath(Vec<i64>);

impl PagePath {
    pub fn root(id: i64) -> Self {
        Self(vec![id])
    }

    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    pub fn current(&self) -> i64 {
        self.0[self.0.len() - 1]
    }

    /// Page the current one was reached from, or the current page at the root
    pub fn source(&self) -> i64 {
        match self.0.len() {
            1 => self.0[0],
            n => self.0[n - 2],
        }
    }

    /// Every segment but the last, or the whole path at the root
    pub fn source_path(&self) -> String {
        match self.0.len() {
            1 => self.to_string(),
            n => join(&self.0[..n - 1]),
        }
    }

    /// Path one level deeper, used for link targets
    pub fn child(&self, id: i64) -> Self {
        let mut ids = self.0.clone();
        ids.push(id);
        Self(ids)
    }

    /// Path truncated after `len` segments
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.clamp(1, self.0.len())].to_vec())
    }
}

fn join(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.0))
    }
}

impl FromStr for PagePath {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(|c| c == '/' || c == '.')
            .map(str::parse)
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(Self(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_and_dot_separators() {
        let path: PagePath = "0/3/7".parse().unwrap();
        assert_eq!(path.ids(), &[0, 3, 7]);
        assert_eq!("0.3.7".parse::<PagePath>().unwrap(), path);
        assert_eq!(path.current(), 7);
        assert_eq!(path.to_string(), "0/3/7");
    }

    #[test]
    fn rejects_any_bad_segment() {
        assert!("".parse::<PagePath>().is_err());
        assert!("0/x/7".parse::<PagePath>().is_err());
        assert!("0/3/".parse::<PagePath>().is_err());
        assert!("0//3".parse::<PagePath>().is_err());
    }

    #[test]
    fn source_is_the_parent_page() {
        let path: PagePath = "0/3/7".parse().unwrap();
        assert_eq!(path.source(), 3);
        assert_eq!(path.source_path(), "0/3");

        let root = PagePath::root(0);
        assert_eq!(root.source(), 0);
        assert_eq!(root.source_path(), "0");
    }

    #[test]
    fn child_and_prefix() {
        let path: PagePath = "0/3".parse().unwrap();
        assert_eq!(path.child(9).to_string(), "0/3/9");
        assert_eq!(path.prefix(1).to_string(), "0");
        assert_eq!(path.prefix(0).to_string(), "0");
        assert_eq!(path.prefix(5), path);
    }
}
