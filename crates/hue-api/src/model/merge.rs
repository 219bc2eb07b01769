// ── Merge-patch engine ──
//
// Applies a sparse patch onto a full value, group by group. Groups absent
// from the patch are left alone; present groups are created on demand and
// merged recursively. Leaf scalars are only overwritten by a non-zero patch
// value, which means a patch cannot set a leaf back to its zero value
// (`on: false`, `brightness: 0.0`). Both the client-side cache and the
// emulator rely on this exact behavior.

use super::resource::{Color, ColorXy, Dimming, Dynamics, Metadata, On, Owner, Resource};

/// In-place merge of a patch of the same type.
///
/// Implementations must be monotonic: nothing present in `self` may become
/// absent, whatever `patch` contains.
pub trait Merge {
    fn merge_from(&mut self, patch: &Self);
}

/// Leaf scalars that have a distinguished "zero" value.
pub trait ZeroValue {
    fn is_zero(&self) -> bool;
}

impl ZeroValue for bool {
    fn is_zero(&self) -> bool {
        !*self
    }
}

impl ZeroValue for i64 {
    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl ZeroValue for f64 {
    // Bit-pattern check: -0.0 is not the zero value, NaN never is.
    fn is_zero(&self) -> bool {
        self.to_bits() == 0
    }
}

impl ZeroValue for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

/// Overwrite `dest` with `src` unless `src` is the zero value.
pub fn merge_scalar<T: ZeroValue + Clone>(dest: &mut T, src: &T) {
    if !src.is_zero() {
        dest.clone_from(src);
    }
}

/// Merge an optional group: absent in `src` leaves `dest` untouched,
/// present in `src` allocates a default group in `dest` if needed.
pub fn merge_group<T: Merge + Default>(dest: &mut Option<T>, src: Option<&T>) {
    if let Some(patch) = src {
        dest.get_or_insert_with(T::default).merge_from(patch);
    }
}

impl Merge for Owner {
    fn merge_from(&mut self, patch: &Self) {
        merge_scalar(&mut self.rid, &patch.rid);
        merge_scalar(&mut self.rtype, &patch.rtype);
    }
}

impl Merge for Metadata {
    fn merge_from(&mut self, patch: &Self) {
        merge_scalar(&mut self.name, &patch.name);
    }
}

impl Merge for On {
    fn merge_from(&mut self, patch: &Self) {
        merge_scalar(&mut self.on, &patch.on);
    }
}

impl Merge for Dimming {
    fn merge_from(&mut self, patch: &Self) {
        merge_scalar(&mut self.brightness, &patch.brightness);
    }
}

impl Merge for Dynamics {
    fn merge_from(&mut self, patch: &Self) {
        merge_scalar(&mut self.duration, &patch.duration);
    }
}

impl Merge for ColorXy {
    fn merge_from(&mut self, patch: &Self) {
        merge_scalar(&mut self.x, &patch.x);
        merge_scalar(&mut self.y, &patch.y);
    }
}

impl Merge for Color {
    fn merge_from(&mut self, patch: &Self) {
        merge_group(&mut self.xy, patch.xy.as_ref());
    }
}

impl Merge for Resource {
    fn merge_from(&mut self, patch: &Self) {
        merge_scalar(&mut self.id, &patch.id);
        merge_scalar(&mut self.resource_type, &patch.resource_type);
        merge_group(&mut self.owner, patch.owner.as_ref());
        merge_group(&mut self.metadata, patch.metadata.as_ref());
        merge_group(&mut self.on, patch.on.as_ref());
        merge_group(&mut self.dimming, patch.dimming.as_ref());
        merge_group(&mut self.color, patch.color.as_ref());
        merge_group(&mut self.dynamics, patch.dynamics.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::resource::TYPE_LIGHT;
    use pretty_assertions::assert_eq;

    fn full_light() -> Resource {
        Resource {
            id: "id".into(),
            resource_type: TYPE_LIGHT.into(),
            owner: Some(Owner {
                rid: "dev".into(),
                rtype: "device".into(),
            }),
            metadata: Some(Metadata {
                name: "Desk".into(),
            }),
            on: Some(On { on: true }),
            dimming: Some(Dimming { brightness: 40.0 }),
            color: Some(Color {
                xy: Some(ColorXy { x: 0.3, y: 0.3 }),
            }),
            dynamics: Some(Dynamics { duration: 100 }),
        }
    }

    fn merged(mut dest: Resource, patch: &Resource) -> Resource {
        dest.merge_from(patch);
        dest
    }

    #[test]
    fn copy_into_empty_resource() {
        let src = Resource {
            id: "id".into(),
            metadata: Some(Metadata {
                name: "name".into(),
            }),
            ..Resource::default()
        };
        assert_eq!(merged(Resource::default(), &src), src);
    }

    #[test]
    fn absent_groups_are_untouched() {
        let dest = full_light();
        let patch = Resource::with_brightness(75.0);

        let out = merged(dest.clone(), &patch);

        assert_eq!(out.dimming, Some(Dimming { brightness: 75.0 }));
        assert_eq!(out.owner, dest.owner);
        assert_eq!(out.metadata, dest.metadata);
        assert_eq!(out.on, dest.on);
        assert_eq!(out.color, dest.color);
        assert_eq!(out.dynamics, dest.dynamics);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let dest = full_light();
        assert_eq!(merged(dest.clone(), &Resource::default()), dest);
    }

    #[test]
    fn absent_in_both_stays_absent() {
        let dest = Resource::new("id", TYPE_LIGHT);
        let out = merged(dest, &Resource::switch_on());
        assert!(out.dimming.is_none());
        assert!(out.color.is_none());
        assert_eq!(out.is_on(), Some(true));
    }

    #[test]
    fn group_is_allocated_before_recursing() {
        let dest = Resource::new("id", TYPE_LIGHT);
        let patch = Resource {
            color: Some(Color {
                xy: Some(ColorXy { x: 0.5, y: 0.0 }),
            }),
            ..Resource::default()
        };

        let out = merged(dest, &patch);

        // y stays at the freshly allocated default.
        assert_eq!(
            out.color,
            Some(Color {
                xy: Some(ColorXy { x: 0.5, y: 0.0 })
            })
        );
    }

    #[test]
    fn nested_composite_merges_per_field() {
        let dest = full_light();
        let patch = Resource {
            color: Some(Color {
                xy: Some(ColorXy { x: 0.0, y: 0.6 }),
            }),
            ..Resource::default()
        };

        let out = merged(dest, &patch);

        assert_eq!(
            out.color,
            Some(Color {
                xy: Some(ColorXy { x: 0.3, y: 0.6 })
            })
        );
    }

    #[test]
    fn present_color_without_xy_keeps_existing_xy() {
        let dest = full_light();
        let patch = Resource {
            color: Some(Color::default()),
            ..Resource::default()
        };
        assert_eq!(merged(dest.clone(), &patch).color, dest.color);
    }

    // `on: false` is indistinguishable from "not set" and is skipped.
    #[test]
    fn zero_value_patch_does_not_switch_off() {
        let dest = full_light();
        let patch = Resource {
            on: Some(On { on: false }),
            ..Resource::default()
        };
        assert_eq!(merged(dest, &patch).is_on(), Some(true));
    }

    #[test]
    fn zero_brightness_is_skipped_but_negative_zero_is_not() {
        let dest = full_light();

        let out = merged(dest.clone(), &Resource::with_brightness(0.0));
        assert_eq!(out.dimming, Some(Dimming { brightness: 40.0 }));

        let out = merged(dest, &Resource::with_brightness(-0.0));
        let brightness = out.dimming.map(|d| d.brightness).unwrap_or_default();
        assert!(brightness.is_sign_negative());
    }

    #[test]
    fn empty_string_does_not_clear_name() {
        let dest = full_light();
        let patch = Resource {
            metadata: Some(Metadata::default()),
            ..Resource::default()
        };
        assert_eq!(merged(dest, &patch).name(), Some("Desk"));
    }

    #[test]
    fn merge_is_idempotent() {
        let patch = Resource {
            on: Some(On { on: true }),
            dimming: Some(Dimming { brightness: 12.5 }),
            color: Some(Color {
                xy: Some(ColorXy { x: 0.7, y: 0.0 }),
            }),
            ..Resource::default()
        };
        for dest in [Resource::default(), full_light(), Resource::new("x", "zone")] {
            let once = merged(dest, &patch);
            let twice = merged(once.clone(), &patch);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn merge_never_removes_present_groups() {
        let patches = [
            Resource::default(),
            Resource::switch_on(),
            Resource::with_brightness(0.0),
            Resource {
                color: Some(Color::default()),
                owner: Some(Owner::default()),
                ..Resource::default()
            },
        ];
        for patch in &patches {
            let out = merged(full_light(), patch);
            assert!(out.owner.is_some());
            assert!(out.metadata.is_some());
            assert!(out.on.is_some());
            assert!(out.dimming.is_some());
            assert!(out.color.as_ref().and_then(|c| c.xy.as_ref()).is_some());
            assert!(out.dynamics.is_some());
            assert_eq!(out.id, "id");
        }
    }

    #[test]
    fn last_applied_wins() {
        let mut dest = full_light();
        dest.merge_from(&Resource::with_brightness(90.0));
        dest.merge_from(&Resource::with_brightness(10.0));
        assert_eq!(dest.dimming, Some(Dimming { brightness: 10.0 }));
    }
}
