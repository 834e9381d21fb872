//! Small shared utilities.

/// Union-find over integer indices with path halving and union by rank.
///
/// Used by the splitter to group literals into variable-connected
/// components.
#[derive(Debug, Clone)]
pub struct IntUnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl IntUnionFind {
    pub fn new(n: usize) -> Self {
        IntUnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, mut current: usize) -> usize {
        while self.parent[current] != current {
            let parent = self.parent[current];
            let grandparent = self.parent[parent];
            self.parent[current] = grandparent;
            current = grandparent;
        }
        current
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[ra] = rb;
            if self.rank[ra] == self.rank[rb] {
                self.rank[rb] += 1;
            }
        }
    }

    /// Group element indices by their component root. Components appear
    /// in order of their smallest element; elements stay in index order.
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: Vec<(usize, Vec<usize>)> = Vec::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            match by_root.iter_mut().find(|(r, _)| *r == root) {
                Some((_, members)) => members.push(i),
                None => by_root.push((root, vec![i])),
            }
        }
        by_root.into_iter().map(|(_, members)| members).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find_components() {
        let mut uf = IntUnionFind::new(5);
        uf.union(0, 2);
        uf.union(3, 4);
        let components = uf.components();
        assert_eq!(components.len(), 3);
        assert!(components.contains(&vec![0, 2]));
        assert!(components.contains(&vec![1]));
        assert!(components.contains(&vec![3, 4]));
    }

    #[test]
    fn test_transitive_union() {
        let mut uf = IntUnionFind::new(4);
        uf.union(0, 1);
        uf.union(1, 2);
        assert_eq!(uf.find(0), uf.find(2));
        assert_ne!(uf.find(0), uf.find(3));
    }
}
