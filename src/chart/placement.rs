//! Placement of each chart layer over the nine palaces
//!
//! Every function returns a fresh array indexed by `Palace::slot()`. Layers
//! that leave the center empty use `Option`.

use log::debug;
use serde::Serialize;

use super::tables::{
    decan_instrument, instrument_ordinal, wonder_offset, Door, Palace, Polarity, Spirit, Star,
    ALL_DOORS, ALL_SPIRITS, ALL_STARS, INSTRUMENTS, NINE_STEMS, RING,
};
use crate::config::DoorRule;
use crate::ganzhi::{SexagenaryPair, Stem};
use crate::{QimenError, Result};

/// A value per palace
pub type Layer<T> = [T; 9];

/// Palaces taking the six instruments of the hidden plate, in walking order
const HIDDEN_RING: [Palace; 6] = [
    Palace(1),
    Palace(5),
    Palace(6),
    Palace(7),
    Palace(8),
    Palace(9),
];

/// Fixed hidden places of the three wonders
const HIDDEN_WONDERS: [(Palace, Stem); 3] = [
    (Palace(4), Stem::Yi),
    (Palace(3), Stem::Bing),
    (Palace(2), Stem::Ding),
];

/// Ring steps that carry `from` onto `to`, the center read as palace 2
pub fn ring_rotation(from: Palace, to: Palace) -> usize {
    (to.ring_position() + 8 - from.ring_position()) % 8
}

/// Palace holding `stem` in a stem layer
pub fn find_stem(layer: &Layer<Stem>, stem: Stem) -> Option<Palace> {
    Palace::all().find(|p| layer[p.slot()] == stem)
}

/// Earth plate: the nine stems laid from the pattern-number palace
pub fn earth_stems(pattern_number: u8, polarity: Polarity) -> Result<Layer<Stem>> {
    let start = Palace::new(pattern_number).ok_or_else(|| {
        QimenError::TableLookup(format!("pattern number {} outside 1..=9", pattern_number))
    })?;

    let mut earth = [Stem::Wu; 9];
    let mut palace = start;
    for stem in NINE_STEMS {
        earth[palace.slot()] = stem;
        palace = palace.numeric_step(polarity);
    }
    Ok(earth)
}

/// Lead star (值符) and envoy door (值使) with their anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lead {
    /// 甲 pair heading the hour's decan
    pub decan_head: SexagenaryPair,
    /// Instrument hiding that 甲
    pub instrument: Stem,
    /// Earth palace of the instrument
    pub origin: Palace,
    /// Palace the lead star flies to: the hour stem's earth palace
    pub destination: Palace,
    pub star: Star,
    pub door: Door,
    /// Palace the envoy door travels to
    pub envoy_destination: Palace,
}

impl Lead {
    /// Rotation shared by the heaven plate and the stars
    pub fn star_rotation(&self) -> usize {
        ring_rotation(self.origin, self.destination)
    }

    pub fn door_rotation(&self) -> usize {
        ring_rotation(self.door.home(), self.envoy_destination)
    }
}

/// Locate the lead and envoy for an hour pillar on an earth plate
///
/// The hour stem's earth palace is the destination. A full earth plate holds
/// every stem but 甲, so the wonder ring offsets only apply to partial plates.
pub fn lead(
    earth: &Layer<Stem>,
    hour: SexagenaryPair,
    polarity: Polarity,
    door_rule: DoorRule,
) -> Result<Lead> {
    let instrument = decan_instrument(hour);
    let origin = find_stem(earth, instrument).unwrap_or(match polarity {
        Polarity::Yang => Palace::KUN,
        Polarity::Yin => Palace::GEN,
    });

    let hour_stem = hour.stem();
    let destination = if hour_stem == Stem::Jia {
        origin
    } else if let Some(palace) = find_stem(earth, hour_stem) {
        palace
    } else if let Some(steps) = wonder_offset(hour_stem) {
        Palace::on_ring(polarity.walk(origin.ring_position(), steps, 8))
    } else {
        return Err(QimenError::TableLookup(format!(
            "hour stem {} missing from the earth plate",
            hour_stem
        )));
    };

    let offset = hour.decan_offset();
    let envoy_destination = match door_rule {
        DoorRule::NumericWalk => (0..offset)
            .fold(origin, |p, _| p.numeric_step(polarity))
            .or_kun(),
        DoorRule::HalfDecan => {
            Palace::on_ring(polarity.walk(origin.ring_position(), offset / 2, 8))
        }
    };

    let lead = Lead {
        decan_head: hour.decan_head(),
        instrument,
        origin,
        destination,
        star: Star::at_home(origin),
        door: Door::at_home(origin),
        envoy_destination,
    };
    debug!(
        "lead {}{} from palace {}: {} to {}, {} to {}",
        lead.decan_head,
        instrument,
        origin,
        lead.star.name(),
        destination,
        lead.door.name(),
        envoy_destination
    );
    Ok(lead)
}

/// Heaven plate: the earth plate turned by `rotation`; the center stays empty
pub fn heaven_stems(earth: &Layer<Stem>, rotation: usize) -> Layer<Option<Stem>> {
    let mut heaven = [None; 9];
    for (i, palace) in RING.iter().enumerate() {
        heaven[Palace::on_ring(i + rotation).slot()] = Some(earth[palace.slot()]);
    }
    heaven
}

/// Flying stars turned by `rotation`; 天禽 is left to travel with 天芮
pub fn stars(rotation: usize) -> Layer<Option<Star>> {
    let mut layer = [None; 9];
    for star in ALL_STARS.iter().filter(|&&s| s != Star::PAIRED) {
        let landed = Palace::on_ring(star.home().ring_position() + rotation);
        layer[landed.slot()] = Some(*star);
    }
    layer
}

/// Doors turned by `rotation`
pub fn doors(rotation: usize) -> Layer<Option<Door>> {
    let mut layer = [None; 9];
    for door in ALL_DOORS {
        let landed = Palace::on_ring(door.home().ring_position() + rotation);
        layer[landed.slot()] = Some(door);
    }
    layer
}

/// Hidden plate
///
/// 乙丙丁 sit fixed in palaces 4, 3 and 2. The instruments fill palaces
/// 1 5 6 7 8 9 starting at the envoy destination (palace 5 when it lies
/// among the fixed three), beginning with the hour stem's instrument or the
/// lead instrument when the hour stem is not one.
pub fn hidden_stems(
    envoy_destination: Palace,
    hour_stem: Stem,
    lead_instrument: Stem,
    polarity: Polarity,
) -> Result<Layer<Stem>> {
    let mut hidden = [Stem::Wu; 9];
    for (palace, stem) in HIDDEN_WONDERS {
        hidden[palace.slot()] = stem;
    }

    let start = HIDDEN_RING
        .iter()
        .position(|&p| p == envoy_destination)
        .unwrap_or(1);
    let first = instrument_ordinal(hour_stem)
        .or_else(|| instrument_ordinal(lead_instrument))
        .ok_or_else(|| {
            QimenError::TableLookup(format!("{} is not an instrument", lead_instrument))
        })?;

    for i in 0..6 {
        let palace = HIDDEN_RING[polarity.walk(start, i, 6)];
        hidden[palace.slot()] = INSTRUMENTS[(first + i) % 6];
    }
    Ok(hidden)
}

/// One spirit layer walked around the ring from `anchor`
pub fn spirits(anchor: Palace, polarity: Polarity) -> Layer<Option<Spirit>> {
    let start = anchor.ring_position();
    let mut layer = [None; 9];
    for (i, spirit) in ALL_SPIRITS.iter().enumerate() {
        layer[Palace::on_ring(polarity.walk(start, i, 8)).slot()] = Some(*spirit);
    }
    layer
}
