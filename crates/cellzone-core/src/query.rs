//! Symbolic cell queries.
//!
//! Expressions are parsed into a typed [`Query`] and evaluated against a
//! [`ComponentRegistry`]. Recognised forms, tried in this order:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `Head:Group:Index` | `Index`-th cell of Head's cell group `Group` |
//! | `Head:ZONE` | union of every region whose name starts with `Head` |
//! | `Head:Group` | cells of Head's cell group `Group` |
//! | `Head:Member[:...]` | resolve the rest against the member's region |
//! | `Head:Offset` | `Offset`-th cell of region Head |
//! | `M-N` | active cells in `[min(M,N), max(M,N))` |
//! | `All` / `all` | every active cell |
//! | `Head` | every cell of region Head |
//!
//! When a path segment could be read two ways (a cell group literally named
//! `"2"` versus ordinal offset 2) the earlier form wins.
//!
//! # Example
//!
//! ```
//! use cellzone_core::{parse_query, Query};
//!
//! assert_eq!(parse_query("all").unwrap(), Query::All);
//! assert_eq!(
//!     parse_query("7-3").unwrap(),
//!     Query::NumericRange { low: 3, high: 7 }
//! );
//! assert_eq!(parse_query("Foo:ZONE").unwrap(), Query::ZonePrefix("Foo".into()));
//! ```

use std::fmt;

use crate::error::{RegistryError, Result};
use crate::logging::{span_names, targets};
use crate::registry::ComponentRegistry;
use crate::CellId;

/// Segment text that selects the zone-prefix form.
pub const ZONE_KEYWORD: &str = "ZONE";

/// One `:`-separated segment after the head of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Raw segment text.
    pub text: String,
    /// The text read as a non-negative integer, if it is one.
    pub index: Option<usize>,
}

impl Segment {
    /// Create a segment, recording its integer reading if any.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = if is_digits(&text) {
            text.parse().ok()
        } else {
            None
        };
        Self { text, index }
    }
}

/// Parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    /// Every active cell.
    All,
    /// Active cells in `[low, high)`.
    NumericRange {
        /// Inclusive lower bound.
        low: CellId,
        /// Exclusive upper bound.
        high: CellId,
    },
    /// Union of the regions whose name starts with the prefix.
    ZonePrefix(String),
    /// Every cell of one region.
    Region(String),
    /// `Head:Segment[:Segment...]`, interpreted against the registry.
    Path {
        /// Region name the path starts from.
        head: String,
        /// Remaining segments, at least one.
        segments: Vec<Segment>,
    },
}

impl Query {
    /// Build the query for `head` followed by `segments`.
    fn scoped(head: &str, segments: &[Segment]) -> Query {
        match segments {
            [] => Query::Region(head.to_string()),
            [only] if only.text == ZONE_KEYWORD => Query::ZonePrefix(head.to_string()),
            _ => Query::Path {
                head: head.to_string(),
                segments: segments.to_vec(),
            },
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::NumericRange { low, high } => write!(f, "{low}-{high}"),
            Self::ZonePrefix(head) => write!(f, "{head}:{ZONE_KEYWORD}"),
            Self::Region(name) => f.write_str(name),
            Self::Path { head, segments } => {
                f.write_str(head)?;
                for segment in segments {
                    write!(f, ":{}", segment.text)?;
                }
                Ok(())
            }
        }
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

// =========================================================================
// Parsing
// =========================================================================

/// Parse a query expression.
pub fn parse_query(expr: &str) -> Result<Query> {
    Parser::new(expr).parse()
}

struct Parser<'a> {
    expr: &'a str,
}

impl<'a> Parser<'a> {
    fn new(expr: &'a str) -> Self {
        Self { expr }
    }

    fn error(&self, message: &str) -> RegistryError {
        RegistryError::parse(self.expr, message)
    }

    fn parse(&self) -> Result<Query> {
        let text = self.expr.trim();
        if text.is_empty() {
            return Err(self.error("empty expression"));
        }
        match text.split_once(':') {
            Some((head, tail)) => self.parse_path(head, tail),
            None => Ok(self.parse_atom(text)),
        }
    }

    /// A colon-free expression: `All`, `M-N` or a region name.
    fn parse_atom(&self, text: &str) -> Query {
        if text == "All" || text == "all" {
            return Query::All;
        }
        if let Some(range) = self.parse_range(text) {
            return range;
        }
        Query::Region(text.to_string())
    }

    fn parse_range(&self, text: &str) -> Option<Query> {
        let (a, b) = text.split_once('-')?;
        if !is_digits(a) || !is_digits(b) {
            return None;
        }
        let a: CellId = a.parse().ok()?;
        let b: CellId = b.parse().ok()?;
        Some(Query::NumericRange {
            low: a.min(b),
            high: a.max(b),
        })
    }

    fn parse_path(&self, head: &str, tail: &str) -> Result<Query> {
        if head.is_empty() {
            return Err(self.error("missing name before ':'"));
        }
        let segments = self.parse_segments(tail)?;
        Ok(Query::scoped(head, &segments))
    }

    fn parse_segments(&self, tail: &str) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut rest = tail;
        loop {
            let (segment, next) = match rest.split_once(':') {
                Some((segment, next)) => (segment, Some(next)),
                None => (rest, None),
            };
            if segment.is_empty() {
                return Err(self.error("empty segment"));
            }
            segments.push(Segment::new(segment));
            match next {
                Some(next) => rest = next,
                None => return Ok(segments),
            }
        }
    }
}

// =========================================================================
// Evaluation
// =========================================================================

/// Evaluates queries against a registry.
#[derive(Debug, Clone, Copy)]
pub struct QueryResolver<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> QueryResolver<'a> {
    /// Create a resolver over `registry`.
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Parse and evaluate `expr`.
    pub fn resolve(&self, expr: &str) -> Result<Vec<CellId>> {
        let _span = tracing::debug_span!(target: targets::QUERY, span_names::QUERY, expr).entered();
        let query = parse_query(expr)?;
        let cells = self.evaluate(&query)?;
        match cells {
            Some(cells) => {
                tracing::debug!(
                    target: targets::QUERY,
                    expr,
                    query = %query,
                    cells = cells.len(),
                    "resolved query"
                );
                Ok(cells)
            }
            None => Err(RegistryError::unresolved(expr.trim())),
        }
    }

    /// Evaluate a parsed query.
    ///
    /// `Ok(None)` means no grammar form applied.
    pub fn evaluate(&self, query: &Query) -> Result<Option<Vec<CellId>>> {
        match query {
            Query::All => Ok(Some(self.registry.active_cells().iter().copied().collect())),
            Query::NumericRange { low, high } => {
                Ok(Some(self.registry.active_in(*low, *high).collect()))
            }
            Query::ZonePrefix(prefix) => self
                .registry
                .zone_group(prefix)
                .map(|cells| Some(cells.all_cells())),
            Query::Region(name) => self
                .registry
                .region_cells(name)
                .map(|cells| Some(cells.all_cells())),
            Query::Path { head, segments } => self.evaluate_path(head, segments),
        }
    }

    fn evaluate_path(&self, head: &str, segments: &[Segment]) -> Result<Option<Vec<CellId>>> {
        let Some((first, rest)) = segments.split_first() else {
            return self.evaluate(&Query::Region(head.to_string()));
        };
        if !self.registry.has_region(head) {
            return Ok(None);
        }
        let groups = self.registry.cell_groups(head);

        // Head:Group:Index
        if let ([next], Some(groups)) = (rest, groups) {
            if let (Some(index), Some(cells)) = (next.index, groups.group(&first.text)) {
                return cells.get(index).map(|&cell| Some(vec![cell])).ok_or_else(|| {
                    RegistryError::index_out_of_range(
                        format!("{head}:{}", first.text),
                        index,
                        cells.len(),
                    )
                });
            }
        }

        // Head:Group
        if rest.is_empty() {
            if let Some(cells) = groups.and_then(|groups| groups.group(&first.text)) {
                return Ok(Some(cells.to_vec()));
            }
        }

        // Head:Member[:...]
        if let Some(member) = self
            .registry
            .members(head)
            .and_then(|members| members.member_region(&first.text))
        {
            tracing::trace!(target: targets::QUERY, head, member, "descending into member");
            return self.evaluate(&Query::scoped(member, rest));
        }

        // Head:Offset
        if let ([], Some(index)) = (rest, first.index) {
            let cells = self.registry.region_cells(head)?;
            return cells
                .nth(index)
                .map(|cell| Some(vec![cell]))
                .ok_or_else(|| RegistryError::index_out_of_range(head, index, cells.len()));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Assembly, CellMap, Component};
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_query("All").unwrap(), Query::All);
        assert_eq!(parse_query("  all ").unwrap(), Query::All);
        assert_eq!(parse_query("ALL").unwrap(), Query::Region("ALL".into()));
        assert_eq!(
            parse_query("10-20").unwrap(),
            Query::NumericRange { low: 10, high: 20 }
        );
        assert_eq!(parse_query("Foo").unwrap(), Query::Region("Foo".into()));
        assert_eq!(parse_query("Foo-Bar").unwrap(), Query::Region("Foo-Bar".into()));
        assert_eq!(parse_query("5-").unwrap(), Query::Region("5-".into()));
        assert_eq!(
            parse_query("Foo:ZONE").unwrap(),
            Query::ZonePrefix("Foo".into())
        );
        assert_eq!(
            parse_query("Foo:inner:3").unwrap(),
            Query::Path {
                head: "Foo".into(),
                segments: vec![Segment::new("inner"), Segment::new("3")],
            }
        );
    }

    #[test]
    fn test_segment_index() {
        assert_eq!(Segment::new("12").index, Some(12));
        assert_eq!(Segment::new("+12").index, None);
        assert_eq!(Segment::new("x1").index, None);
    }

    #[test]
    fn test_parse_errors() {
        for expr in ["", "   ", ":inner", "Foo:", "Foo::1", "Foo:inner:"] {
            let err = parse_query(expr).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParseError, "{expr:?}");
        }
    }

    #[test]
    fn test_display_round_trips_text() {
        for expr in ["All", "3-7", "Foo:ZONE", "Foo", "Foo:inner:2"] {
            assert_eq!(parse_query(expr).unwrap().to_string(), expr);
        }
    }

    /// Registry with:
    /// - `Foo`: cells start..start+5, groups inner=[start+1, start+3], "2"=[start+4]
    /// - `Bar`: assembly with member `door` -> `BarDoor`
    /// - `BarDoor`: two cells
    fn fixture() -> (ComponentRegistry, CellId) {
        let mut reg = ComponentRegistry::new(10_000, 1_000_000);
        let foo = reg.reserve_region("Foo", 10).unwrap();
        let mut cells = CellMap::new();
        cells.set_cells("inner", vec![foo + 1, foo + 3]);
        cells.set_cells("2", vec![foo + 4]);
        reg.attach_object("Foo", Box::new(cells)).unwrap();
        for cell in foo..foo + 5 {
            reg.add_active_cell(cell).unwrap();
        }

        let bar = reg.reserve_region("Bar", 10).unwrap();
        let mut assembly = Assembly::new("gate");
        assembly.members_mut().insert("door", "BarDoor");
        assembly.cells_mut().add_cell("frame", bar);
        reg.attach_object("Bar", Box::new(assembly)).unwrap();
        reg.add_active_cell(bar).unwrap();

        let door = reg.reserve_region("BarDoor", 10).unwrap();
        let mut door_cells = CellMap::new();
        door_cells.set_cells("panel", vec![door + 1]);
        reg.attach_object("BarDoor", Box::new(door_cells)).unwrap();
        reg.add_active_cell(door).unwrap();
        reg.add_active_cell(door + 1).unwrap();
        (reg, foo)
    }

    #[test]
    fn test_group_and_index() {
        let (reg, foo) = fixture();
        let resolver = QueryResolver::new(&reg);
        assert_eq!(resolver.resolve("Foo:inner").unwrap(), vec![foo + 1, foo + 3]);
        assert_eq!(resolver.resolve("Foo:inner:1").unwrap(), vec![foo + 3]);

        let err = resolver.resolve("Foo:inner:2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexError);
    }

    #[test]
    fn test_offset() {
        let (reg, foo) = fixture();
        let resolver = QueryResolver::new(&reg);
        assert_eq!(resolver.resolve("Foo:0").unwrap(), vec![foo]);
        assert_eq!(resolver.resolve("Foo:3").unwrap(), vec![foo + 3]);

        let err = resolver.resolve("Foo:5").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexError);
    }

    #[test]
    fn test_numeric_group_name_shadows_offset() {
        let (reg, foo) = fixture();
        let resolver = QueryResolver::new(&reg);
        // "2" is a cell group of Foo, so it wins over ordinal offset 2.
        assert_eq!(resolver.resolve("Foo:2").unwrap(), vec![foo + 4]);
        assert_eq!(resolver.resolve("Foo:2:0").unwrap(), vec![foo + 4]);
    }

    #[test]
    fn test_member_descent() {
        let (reg, _) = fixture();
        let door = reg.region_span("BarDoor").unwrap().start;
        let resolver = QueryResolver::new(&reg);
        assert_eq!(resolver.resolve("Bar:door").unwrap(), vec![door, door + 1]);
        assert_eq!(resolver.resolve("Bar:door:panel").unwrap(), vec![door + 1]);
        assert_eq!(resolver.resolve("Bar:door:1").unwrap(), vec![door + 1]);
        assert_eq!(resolver.resolve("Bar:door:ZONE").unwrap(), vec![door, door + 1]);
    }

    #[test]
    fn test_zone_prefix() {
        let (reg, _) = fixture();
        let resolver = QueryResolver::new(&reg);
        let bar = reg.region_span("Bar").unwrap().start;
        let door = reg.region_span("BarDoor").unwrap().start;
        assert_eq!(resolver.resolve("Bar:ZONE").unwrap(), vec![bar, door, door + 1]);

        let err = resolver.resolve("Baz:ZONE").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);
    }

    #[test]
    fn test_all_and_range() {
        let (reg, foo) = fixture();
        let resolver = QueryResolver::new(&reg);
        let all = resolver.resolve("All").unwrap();
        assert_eq!(all.len(), reg.active_count());

        let expr = format!("{}-{}", foo + 4, foo + 1);
        assert_eq!(resolver.resolve(&expr).unwrap(), vec![foo + 1, foo + 2, foo + 3]);
    }

    #[test]
    fn test_unresolved_names_expression() {
        let (reg, _) = fixture();
        let resolver = QueryResolver::new(&reg);

        let err = resolver.resolve("Foo:outer").unwrap_err();
        assert_eq!(err, RegistryError::unresolved("Foo:outer"));

        let err = resolver.resolve("Nope:inner").unwrap_err();
        assert_eq!(err, RegistryError::unresolved("Nope:inner"));

        let err = resolver.resolve("Nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);
    }

    #[test]
    fn test_void_region_offset_only() {
        let mut reg = ComponentRegistry::new(10_000, 1_000_000);
        let start = reg.reserve_region("Bare", 3).unwrap();
        reg.add_active_cell(start + 2).unwrap();
        let resolver = QueryResolver::new(&reg);
        assert_eq!(resolver.resolve("Bare:0").unwrap(), vec![start + 2]);
        assert!(resolver.resolve("Bare:inner").is_err());
    }

    #[test]
    fn test_component_without_groups_is_skipped() {
        struct Plain;
        impl Component for Plain {}

        let mut reg = ComponentRegistry::new(10_000, 1_000_000);
        let start = reg.reserve_region("P", 3).unwrap();
        reg.attach_object("P", Box::new(Plain)).unwrap();
        reg.add_active_cell(start).unwrap();
        let resolver = QueryResolver::new(&reg);
        assert_eq!(resolver.resolve("P:0").unwrap(), vec![start]);
    }
}
