use crate::items::Envpoint;
use std::ops::Range;

/// Animation curve over a shared run of envpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub name: Option<String>,
    /// 1 for sounds, 3 for positions, 4 for colors
    pub channels: i32,
    pub start_point: usize,
    pub num_points: usize,
}

impl Envelope {
    pub fn points(&self) -> Range<usize> {
        self.start_point..self.start_point + self.num_points
    }

    /// The envelope's run within `envpoints`, if it fits
    pub fn slice<'p>(&self, envpoints: &'p [Envpoint]) -> Option<&'p [Envpoint]> {
        envpoints.get(self.points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice() {
        let points: Vec<Envpoint> = (0..9)
            .map(|time| Envpoint {
                time,
                ..Default::default()
            })
            .collect();
        let envelope = Envelope {
            name: Some("ColorEnv".into()),
            channels: 4,
            start_point: 4,
            num_points: 5,
        };
        let run = envelope.slice(&points).unwrap();
        assert_eq!(run.len(), 5);
        assert_eq!(run[0].time, 4);

        let overflow = Envelope {
            start_point: 6,
            ..envelope
        };
        assert!(overflow.slice(&points).is_none());
    }
}
