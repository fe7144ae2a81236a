use std::fmt::Write as _;

use tracing::warn;

/// Parent/child links between the exported objects, by object index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectForest {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl ObjectForest {
    /// Builds the forest from each object's parent. Children and roots keep
    /// object order. A parent cycle is cut at the first object found on it,
    /// which becomes a root.
    pub fn new(parents: &[Option<usize>]) -> Self {
        let count = parents.len();
        let mut parents = parents.to_vec();
        for start in 0..count {
            let mut node = start;
            let mut steps = 0;
            while let Some(parent) = parents[node] {
                node = parent;
                steps += 1;
                if steps > count {
                    warn!("object {} is part of a parent cycle, making it a root", node);
                    parents[node] = None;
                    break;
                }
            }
        }

        let mut forest = ObjectForest {
            roots: vec![],
            children: vec![Vec::new(); count],
        };
        for (index, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => forest.children[*p].push(index),
                None => forest.roots.push(index),
            }
        }
        forest
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// `<index>{<children>}` for every root, depth first, NUL terminated.
    pub fn encode(&self) -> Vec<u8> {
        let mut text = String::new();
        // (node, next child to visit)
        let mut stack: Vec<(usize, usize)> = vec![];
        for &root in &self.roots {
            let _ = write!(text, "{}{{", root);
            stack.push((root, 0));
            while let Some((node, next)) = stack.last_mut() {
                match self.children[*node].get(*next) {
                    Some(&child) => {
                        *next += 1;
                        let _ = write!(text, "{}{{", child);
                        stack.push((child, 0));
                    }
                    None => {
                        text.push('}');
                        stack.pop();
                    }
                }
            }
        }
        let mut bytes = text.into_bytes();
        bytes.push(0);
        bytes
    }

    /// Inverse of [`ObjectForest::encode`]. Every object below `count` must
    /// appear exactly once; `bytes` must be exactly the encoded tree.
    pub fn decode(bytes: &[u8], count: usize) -> Result<Self, String> {
        let Some((&0, body)) = bytes.split_last() else {
            return Err("object tree is not NUL terminated".to_string());
        };
        let mut parents: Vec<Option<Option<usize>>> = vec![None; count];
        let mut open: Vec<usize> = vec![];
        let mut pos = 0;
        while pos < body.len() {
            match body[pos] {
                b'}' => {
                    open.pop().ok_or_else(|| format!("unbalanced '}}' at byte {}", pos))?;
                    pos += 1;
                }
                b'0'..=b'9' => {
                    let start = pos;
                    while pos < body.len() && body[pos].is_ascii_digit() {
                        pos += 1;
                    }
                    let digits = std::str::from_utf8(&body[start..pos]).map_err(|e| e.to_string())?;
                    let index: usize = digits
                        .parse()
                        .map_err(|_| format!("bad object index '{}'", digits))?;
                    if body.get(pos) != Some(&b'{') {
                        return Err(format!("expected '{{' after object {}", index));
                    }
                    pos += 1;
                    let slot = parents
                        .get_mut(index)
                        .ok_or_else(|| format!("object index {} out of range ({} objects)", index, count))?;
                    if slot.is_some() {
                        return Err(format!("object {} appears twice", index));
                    }
                    *slot = Some(open.last().copied());
                    open.push(index);
                }
                other => return Err(format!("unexpected byte {:#04x} at {}", other, pos)),
            }
        }
        if !open.is_empty() {
            return Err(format!("{} unclosed '{{'", open.len()));
        }
        let parents = parents
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.ok_or_else(|| format!("object {} missing from tree", i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(&parents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siblings_under_one_root() {
        let forest = ObjectForest::new(&[None, Some(0), Some(0)]);
        assert_eq!(forest.encode(), b"0{1{}2{}}\0");
    }

    #[test]
    fn roots_follow_object_order() {
        let forest = ObjectForest::new(&[Some(2), None, None, Some(0)]);
        assert_eq!(forest.roots(), &[1, 2]);
        assert_eq!(forest.encode(), b"1{}2{0{3{}}}\0");
    }

    #[test]
    fn cycles_are_cut() {
        let forest = ObjectForest::new(&[Some(1), Some(0), None]);
        assert_eq!(forest.roots().len(), 2);
        let encoded = forest.encode();
        assert_eq!(ObjectForest::decode(&encoded, 3), Ok(forest));
    }

    #[test]
    fn decode_inverts_encode() {
        let forest = ObjectForest::new(&[None, Some(0), Some(1), None, Some(3), Some(0)]);
        assert_eq!(ObjectForest::decode(&forest.encode(), 6), Ok(forest));
    }

    #[test]
    fn decode_rejects_bad_trees() {
        let cases: [(&[u8], usize); 7] = [
            (b"0{}", 1),
            (b"0{\0", 1),
            (b"0{}}\0", 1),
            (b"1{}\0", 1),
            (b"0{}0{}\0", 1),
            (b"0{}\0", 2),
            (b"0x{}\0", 1),
        ];
        for (bytes, count) in cases {
            assert!(ObjectForest::decode(bytes, count).is_err(), "{:?}", bytes);
        }
    }
}
