//! The result tree produced by evaluating a schema against an instance.
use ahash::AHashSet;
use jschema_referencing::JsonPointer;
use serde_json::Value;

/// One node of the evaluation result tree: the outcome of applying a single keyword (or
/// an entire schema object) at a particular instance location.
///
/// A [`Scope`] owns its children rather than borrowing them, so a whole evaluation run
/// can be returned, inspected, and converted to an output format without holding onto
/// the schema or instance it was computed from.
#[derive(Debug, Clone)]
pub struct Scope {
    /// The keyword this node reports on (`None` for a schema-object-level node, whose
    /// `children` are the keyword nodes).
    pub keyword: Option<&'static str>,
    pub instance_path: JsonPointer,
    pub schema_path: JsonPointer,
    pub valid: bool,
    /// The annotation this keyword produces on success (`properties` -> matched property
    /// names, `items`/`prefixItems` -> count evaluated, etc). `None` for keywords that
    /// never annotate, or when evaluation failed.
    pub annotation: Option<Value>,
    pub errors: Vec<String>,
    pub children: Vec<Scope>,
}

/// Which array indices an applicator's subtree already covers, as distinguished by
/// [`Scope::evaluated_items_coverage`]: a contiguous prefix (from `items`/`prefixItems`/
/// `unevaluatedItems`) versus the sparse set of indices `contains` actually matched.
#[derive(Debug, Default, Clone)]
pub struct ItemsCoverage {
    /// Indices `0..prefix` are covered; `usize::MAX` means the whole array is.
    pub prefix: usize,
    /// Indices covered individually, regardless of position.
    pub indices: AHashSet<usize>,
}

impl ItemsCoverage {
    #[must_use]
    pub fn is_evaluated(&self, index: usize) -> bool {
        self.prefix == usize::MAX || index < self.prefix || self.indices.contains(&index)
    }

    pub fn merge(&mut self, other: ItemsCoverage) {
        self.prefix = self.prefix.max(other.prefix);
        self.indices.extend(other.indices);
    }
}

impl Scope {
    #[must_use]
    pub fn leaf(
        keyword: &'static str,
        instance_path: JsonPointer,
        schema_path: JsonPointer,
        valid: bool,
    ) -> Self {
        Scope {
            keyword: Some(keyword),
            instance_path,
            schema_path,
            valid,
            annotation: None,
            errors: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A schema-object-level node (as opposed to a single keyword's): its `children`
    /// are the keyword scopes produced at that schema object.
    #[must_use]
    pub fn node(instance_path: JsonPointer, schema_path: JsonPointer, valid: bool) -> Self {
        Scope {
            keyword: None,
            instance_path,
            schema_path,
            valid,
            annotation: None,
            errors: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Value) -> Self {
        self.annotation = Some(annotation);
        self
    }

    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.valid = false;
        self.errors.push(message.into());
        self
    }

    /// Attach `children`, ANDing this node's validity with "every child is valid".
    /// Correct for applicators whose own validity *is* "all children valid"
    /// (`allOf`, `properties`, `items`, ...). For applicators with other aggregate
    /// rules (`anyOf`, `oneOf`, `contains`), compute `valid` separately and attach
    /// children with [`Scope::with_raw_children`] instead.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Scope>) -> Self {
        self.valid = self.valid && children.iter().all(|c| c.valid);
        self.children = children;
        self
    }

    /// Attach `children` without touching this node's own `valid` flag.
    #[must_use]
    pub fn with_raw_children(mut self, children: Vec<Scope>) -> Self {
        self.children = children;
        self
    }

    /// Recursively collect every property name annotated as evaluated anywhere beneath
    /// this node, descending through transparent applicators (`allOf`, the winning
    /// branch of `anyOf`/`oneOf`, `if`/`then`/`else`, `$ref`, `$dynamicRef`,
    /// `dependentSchemas`) and stopping at `not` and a failed `if`.
    #[must_use]
    pub fn evaluated_properties(&self) -> AHashSet<String> {
        let mut out = AHashSet::new();
        self.collect_properties(&mut out);
        out
    }

    fn collect_properties(&self, out: &mut AHashSet<String>) {
        if !self.valid {
            return;
        }
        match self.keyword {
            Some("properties") | Some("patternProperties") | Some("additionalProperties")
            | Some("unevaluatedProperties") => {
                if let Some(Value::Array(names)) = &self.annotation {
                    for name in names {
                        if let Value::String(s) = name {
                            out.insert(s.clone());
                        }
                    }
                }
            }
            Some("not") => return,
            _ => {}
        }
        for child in &self.children {
            child.collect_properties(out);
        }
    }

    /// Recursively compute which array indices are covered as "evaluated" beneath this
    /// node, with the same transparency rules as [`Scope::evaluated_properties`].
    ///
    /// `items`/`prefixItems`/`unevaluatedItems` cover a contiguous prefix (or, for
    /// `unevaluatedItems`, the remaining suffix through the end of the array); `contains`
    /// covers only the sparse set of indices it actually matched. These two kinds of
    /// coverage are kept distinct rather than folded into one `max()` accumulator:
    /// `contains` against `[1, 5, 1, 5]` with `{"const": 5}` only covers indices 1 and 3,
    /// not "everything up to index 3".
    #[must_use]
    pub fn evaluated_items_coverage(&self) -> ItemsCoverage {
        let mut coverage = ItemsCoverage::default();
        self.collect_items(&mut coverage);
        coverage
    }

    fn collect_items(&self, coverage: &mut ItemsCoverage) {
        if !self.valid {
            return;
        }
        match self.keyword {
            Some("items") | Some("prefixItems") | Some("unevaluatedItems") => {
                if let Some(Value::Number(n)) = &self.annotation {
                    if let Some(count) = n.as_u64() {
                        coverage.prefix = coverage.prefix.max(count as usize);
                    }
                } else if let Some(Value::Bool(true)) = &self.annotation {
                    coverage.prefix = usize::MAX;
                }
            }
            Some("contains") => {
                if let Some(Value::Array(indexes)) = &self.annotation {
                    for idx in indexes {
                        if let Some(i) = idx.as_u64() {
                            coverage.indices.insert(i as usize);
                        }
                    }
                }
            }
            Some("not") => return,
            _ => {}
        }
        for child in &self.children {
            child.collect_items(coverage);
        }
    }

    /// All error messages in this subtree, depth-first, paired with their instance path.
    #[must_use]
    pub fn flatten_errors(&self) -> Vec<(JsonPointer, String)> {
        let mut out = Vec::new();
        self.collect_errors(&mut out);
        out
    }

    fn collect_errors(&self, out: &mut Vec<(JsonPointer, String)>) {
        for message in &self.errors {
            out.push((self.instance_path.clone(), message.clone()));
        }
        for child in &self.children {
            child.collect_errors(out);
        }
    }
}
