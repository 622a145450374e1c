//! Player health: a number of hits before death, shown as hearts

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Health {
    max_hits: u32,
    hits: u32,
}

impl Health {
    pub fn new(max_hits: u32) -> Self {
        Self { max_hits, hits: 0 }
    }

    /// Take `amount` hits. Returns true when this reaches `max_hits`.
    pub fn take_hit(&mut self, amount: u32) -> bool {
        self.hits = self.hits.saturating_add(amount);
        tracing::debug!("Health: {}/{} hits", self.hits, self.max_hits);
        self.is_dead()
    }

    pub fn reset(&mut self) {
        self.hits = 0;
    }

    pub fn is_dead(&self) -> bool {
        self.hits >= self.max_hits
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Hearts still shown on the HUD
    pub fn hearts_visible(&self) -> u32 {
        self.max_hits.saturating_sub(self.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dies_at_max_hits() {
        let mut h = Health::new(5);
        assert!(!h.take_hit(1));
        assert_eq!(h.hearts_visible(), 4);
        assert!(!h.take_hit(3));
        assert!(h.take_hit(1));
        assert_eq!(h.hearts_visible(), 0);
        // Overkill never underflows the hearts
        assert!(h.take_hit(2));
        assert_eq!(h.hearts_visible(), 0);

        h.reset();
        assert_eq!(h.hearts_visible(), 5);
        assert!(!h.is_dead());
    }
}
