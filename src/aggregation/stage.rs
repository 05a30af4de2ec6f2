//! Pipeline stages

use serde_json::{Map, Value};

use crate::expression::{Repr, ResolutionContext};
use crate::predicate::Predicate;
use crate::sort::SortOp;

/// The fixed set of stage names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    Match,
    Group,
    Sort,
    Limit,
    Skip,
    Project,
    AddFields,
    Unwind,
    Lookup,
    Merge,
    Out,
    Sample,
    GraphLookup,
    ReplaceRoot,
    Count,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Match => "$match",
            StageName::Group => "$group",
            StageName::Sort => "$sort",
            StageName::Limit => "$limit",
            StageName::Skip => "$skip",
            StageName::Project => "$project",
            StageName::AddFields => "$addFields",
            StageName::Unwind => "$unwind",
            StageName::Lookup => "$lookup",
            StageName::Merge => "$merge",
            StageName::Out => "$out",
            StageName::Sample => "$sample",
            StageName::GraphLookup => "$graphLookup",
            StageName::ReplaceRoot => "$replaceRoot",
            StageName::Count => "$count",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let name = match key {
            "$match" => StageName::Match,
            "$group" => StageName::Group,
            "$sort" => StageName::Sort,
            "$limit" => StageName::Limit,
            "$skip" => StageName::Skip,
            "$project" => StageName::Project,
            "$addFields" => StageName::AddFields,
            "$unwind" => StageName::Unwind,
            "$lookup" => StageName::Lookup,
            "$merge" => StageName::Merge,
            "$out" => StageName::Out,
            "$sample" => StageName::Sample,
            "$graphLookup" => StageName::GraphLookup,
            "$replaceRoot" => StageName::ReplaceRoot,
            "$count" => StageName::Count,
            _ => return None,
        };
        Some(name)
    }
}

/// Stage body; filters and sorts keep their typed form until render
#[derive(Debug, Clone)]
pub enum StageBody {
    Filter(Predicate),
    Sort(SortOp),
    Expr(Repr),
}

impl StageBody {
    fn render(&self, ctx: &ResolutionContext) -> Value {
        match self {
            StageBody::Filter(predicate) => predicate.render(ctx),
            StageBody::Sort(sort) => sort.render(ctx),
            StageBody::Expr(repr) => repr.express(ctx),
        }
    }
}

/// One `{"$name": body}` pipeline entry
#[derive(Debug, Clone)]
pub struct Stage {
    name: StageName,
    body: StageBody,
}

impl Stage {
    pub fn new(name: StageName, body: StageBody) -> Self {
        Self { name, body }
    }

    pub fn name(&self) -> StageName {
        self.name
    }

    pub fn body(&self) -> &StageBody {
        &self.body
    }

    pub fn render(&self, ctx: &ResolutionContext) -> Value {
        let mut map = Map::with_capacity(1);
        map.insert(self.name.as_str().to_string(), self.body.render(ctx));
        Value::Object(map)
    }
}
