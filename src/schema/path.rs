use std::fmt;

/// One descent through a conditional branch: the matched rule's position in
/// the parent's rule list and the child's position within that rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchStep {
    pub rule: usize,
    pub child: usize,
}

/// Structural address of a field: a root position within the form's declared
/// field list, followed by branch steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    root: usize,
    steps: Vec<BranchStep>,
}

impl FieldPath {
    pub fn root(index: usize) -> Self {
        Self {
            root: index,
            steps: Vec::new(),
        }
    }

    /// Returns the path of the `child`-th field of rule `rule` beneath this one.
    pub fn child(&self, rule: usize, child: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(BranchStep { rule, child });
        Self {
            root: self.root,
            steps,
        }
    }

    pub fn parent(&self) -> Option<(FieldPath, BranchStep)> {
        let (last, rest) = self.steps.split_last()?;
        Some((
            FieldPath {
                root: self.root,
                steps: rest.to_vec(),
            },
            *last,
        ))
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    pub fn steps(&self) -> &[BranchStep] {
        &self.steps
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fields[{}]", self.root)?;
        for step in &self.steps {
            write!(f, ".rule[{}].field[{}]", step.rule, step.child)?;
        }
        Ok(())
    }
}
