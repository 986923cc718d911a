//! Constraint serialization: the output shape of spec §6.

use serde_json::{json, Value};
use viewsynth_core::{ConstraintCandidate, Op};

fn op_symbol(op: Op) -> &'static str {
    match op {
        Op::Eq => "=",
        Op::Le => "<=",
        Op::Ge => ">=",
    }
}

/// Cassowary-style strong/medium/weak priority bucket, derived from the
/// candidate's posterior score. There is no surviving upstream source for
/// the exact thresholds (see `DESIGN.md`); these follow the conventional
/// three-tier split a Kiwi/Cassowary consumer expects.
fn priority_bucket(score: f64) -> [u8; 3] {
    if score >= 0.9 {
        [1, 0, 0]
    } else if score >= 0.6 {
        [0, 1, 0]
    } else {
        [0, 0, 1]
    }
}

/// Serialize one learned constraint candidate to spec §6's output shape.
pub fn candidate_to_json(candidate: &ConstraintCandidate) -> Value {
    let c = &candidate.constraint;
    json!({
        "y": c.y.to_string(),
        "x": c.x.as_ref().map(ToString::to_string),
        "a": c.a.to_string(),
        "b": c.b.to_string(),
        "op": op_symbol(c.op),
        "kind": format!("{:?}", c.kind),
        "priority": priority_bucket(candidate.score),
        "sample_count": c.sample_count,
        "axioms": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsynth_core::rational::int;
    use viewsynth_core::{AnchorId, Attribute, Constraint, ConstraintKind};

    #[test]
    fn serializes_the_spec_6_shape() {
        let template = Constraint::template(
            ConstraintKind::SizeConstant,
            AnchorId::new("header", Attribute::Height),
            None,
        );
        let learned = template.instantiate(int(0), int(80), Op::Eq, 0.95, 2);
        let candidate = ConstraintCandidate::new(learned, 0.95);
        let value = candidate_to_json(&candidate);
        assert_eq!(value["y"], "header.height");
        assert_eq!(value["x"], Value::Null);
        assert_eq!(value["b"], "80");
        assert_eq!(value["op"], "=");
        assert_eq!(value["sample_count"], 2);
        assert_eq!(value["axioms"], serde_json::json!([]));
    }
}
