use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use log::debug;

use super::super::hexbin::{HexCell, HexGrid};
use super::super::{CellCache, CellCacheKey, SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn cell_cache_key(&self) -> CellCacheKey {
        CellCacheKey {
            inventory_revision: self.inventory_revision,
            date_index: self.view.date_index,
            hex_radius: self.hex_radius,
            group_filter_revision: self.group_filter_revision,
        }
    }

    pub(in crate::app) fn visible_asset_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let range = self.inventory.day_range(self.view.date_index);
        range.filter(move |&index| {
            self.inventory
                .assets
                .get(index)
                .is_some_and(|asset| !self.hidden_groups.contains(&asset.group))
        })
    }

    pub(in crate::app) fn cached_cells(
        &mut self,
    ) -> (Arc<Vec<HexCell>>, Arc<HashMap<(i32, i32), usize>>) {
        let key = self.cell_cache_key();
        if let Some(cache) = &self.cell_cache
            && cache.key == key
        {
            return (Arc::clone(&cache.cells), Arc::clone(&cache.index_by_key));
        }

        let grid = HexGrid::new(self.hex_radius);
        let cells = grid.bin(
            self.visible_asset_indices()
                .map(|index| (index, &self.inventory.assets[index])),
        );
        let index_by_key = cells
            .iter()
            .enumerate()
            .map(|(slot, cell)| (cell.key, slot))
            .collect::<HashMap<_, _>>();

        debug!(
            "rebuilt {} hex cells for day {} at radius {:.1}",
            cells.len(),
            self.view.date_index,
            self.hex_radius
        );

        let cells = Arc::new(cells);
        let index_by_key = Arc::new(index_by_key);
        self.cell_cache = Some(CellCache {
            key,
            cells: Arc::clone(&cells),
            index_by_key: Arc::clone(&index_by_key),
        });
        (cells, index_by_key)
    }

    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.inventory_revision == self.inventory_revision
            && cached.date_index == self.view.date_index
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .inventory
            .day_range(self.view.date_index)
            .filter(|&index| {
                let asset = &self.inventory.assets[index];
                fuzzy_match_score(&matcher, &asset.name, search_query).is_some()
                    || fuzzy_match_score(&matcher, &asset.id, search_query).is_some()
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            inventory_revision: self.inventory_revision,
            date_index: self.view.date_index,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn set_group_visible(&mut self, group: &str, visible: bool) {
        let changed = if visible {
            self.hidden_groups.remove(group)
        } else {
            self.hidden_groups.insert(group.to_owned())
        };

        if changed {
            self.group_filter_revision = self.group_filter_revision.wrapping_add(1);
            debug!("group {group} visible: {visible}");
        }
    }
}
