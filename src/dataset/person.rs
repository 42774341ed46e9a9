use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub servers: BTreeSet<String>,
}

impl Person {
    pub fn mutual_count(&self) -> usize {
        self.servers.len()
    }

    pub fn shared_servers(&self, other: &Person) -> usize {
        self.servers.intersection(&other.servers).count()
    }
}
