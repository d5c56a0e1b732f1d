use serde::{Deserialize, Serialize};

/// One primitive step of a descrambling routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "lowercase")]
pub enum TransformOp {
    /// Reverse the whole string.
    Reverse,
    /// Exchange the first character with the one at `i % len`.
    Swap(usize),
    /// Drop the first `n` characters (clamped to the length).
    Slice(usize),
}

impl TransformOp {
    fn apply_to(self, chars: &mut Vec<char>) {
        match self {
            TransformOp::Reverse => chars.reverse(),
            TransformOp::Swap(i) => {
                if !chars.is_empty() {
                    let j = i % chars.len();
                    chars.swap(0, j);
                }
            }
            TransformOp::Slice(n) => {
                let n = n.min(chars.len());
                chars.drain(..n);
            }
        }
    }
}

/// Ordered operations recovered from one player script version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescramblingTransform(Vec<TransformOp>);

impl DescramblingTransform {
    pub fn new(ops: Vec<TransformOp>) -> Self {
        Self(ops)
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies every operation in recorded order.
    pub fn apply(&self, signature: &str) -> String {
        let mut chars: Vec<char> = signature.chars().collect();
        for op in &self.0 {
            op.apply_to(&mut chars);
        }
        chars.into_iter().collect()
    }
}

impl std::fmt::Display for DescramblingTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|op| match op {
                TransformOp::Reverse => "reverse".to_string(),
                TransformOp::Swap(i) => format!("swap({i})"),
                TransformOp::Slice(n) => format!("slice({n})"),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_then_slice_in_order() {
        let t = DescramblingTransform::new(vec![TransformOp::Swap(2), TransformOp::Slice(1)]);
        // swap(2): "abcdef" -> "cbadef"; slice(1): -> "badef"
        assert_eq!(t.apply("abcdef"), "badef");

        let reversed_order =
            DescramblingTransform::new(vec![TransformOp::Slice(1), TransformOp::Swap(2)]);
        assert_eq!(reversed_order.apply("abcdef"), "dcbef");
    }

    #[test]
    fn swap_index_wraps_modulo_length() {
        let t = DescramblingTransform::new(vec![TransformOp::Swap(7)]);
        // 7 % 3 == 1
        assert_eq!(t.apply("xyz"), "yxz");
        assert_eq!(t.apply(""), "");
    }

    #[test]
    fn slice_is_clamped() {
        let t = DescramblingTransform::new(vec![TransformOp::Slice(10)]);
        assert_eq!(t.apply("abc"), "");
    }

    #[test]
    fn reverse_whole_string() {
        let t = DescramblingTransform::new(vec![TransformOp::Reverse]);
        assert_eq!(t.apply("abc.def"), "fed.cba");
    }

    #[test]
    fn empty_transform_is_identity() {
        assert_eq!(DescramblingTransform::default().apply("sig"), "sig");
    }

    #[test]
    fn json_shape() {
        let t = DescramblingTransform::new(vec![
            TransformOp::Reverse,
            TransformOp::Swap(3),
            TransformOp::Slice(2),
        ]);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(
            json,
            r#"[{"op":"reverse"},{"op":"swap","arg":3},{"op":"slice","arg":2}]"#
        );
        let back: DescramblingTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert_eq!(t.to_string(), "[reverse, swap(3), slice(2)]");
    }
}
