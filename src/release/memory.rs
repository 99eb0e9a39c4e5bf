//! In-memory release host for tests

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{NewRelease, Release, ReleaseAsset, ReleaseHost};
use crate::error::{self, EcopackError, Result};

#[derive(Default)]
struct State {
    releases: Vec<Release>,
    assets: BTreeMap<u64, Vec<(ReleaseAsset, Vec<u8>)>>,
    commits: BTreeSet<String>,
    next_id: u64,
    create_failures: VecDeque<EcopackError>,
    upload_failures: VecDeque<EcopackError>,
    concurrent_create: Option<NewRelease>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryHost {
    state: RefCell<State>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commit(self, sha: &str) -> Self {
        self.state.borrow_mut().commits.insert(sha.to_string());
        self
    }

    /// Errors returned by the next release creations, in order
    pub fn fail_creates(&self, errors: Vec<EcopackError>) {
        self.state.borrow_mut().create_failures.extend(errors);
    }

    /// Another writer creates `request` just before the next creation
    pub fn create_concurrently(&self, request: NewRelease) {
        self.state.borrow_mut().concurrent_create = Some(request);
    }

    /// Errors returned by the next uploads, in order
    pub fn fail_uploads(&self, errors: Vec<EcopackError>) {
        self.state.borrow_mut().upload_failures.extend(errors);
    }

    pub fn releases(&self) -> Vec<Release> {
        self.state.borrow().releases.clone()
    }

    pub fn assets(&self, release_id: u64) -> Vec<ReleaseAsset> {
        self.state
            .borrow()
            .assets
            .get(&release_id)
            .map(|assets| assets.iter().map(|(a, _)| a.clone()).collect())
            .unwrap_or_default()
    }

    pub fn asset_content(&self, release_id: u64, name: &str) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .assets
            .get(&release_id)?
            .iter()
            .find(|(a, _)| a.name == name)
            .map(|(_, bytes)| bytes.clone())
    }
}

fn new_release(id: u64, request: &NewRelease) -> Release {
    Release {
        id,
        tag: request.tag.clone(),
        name: Some(request.name.clone()),
        body: Some(request.body.clone()),
        target_commitish: request.target.clone(),
        upload_url: String::new(),
    }
}

impl ReleaseHost for MemoryHost {
    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        Ok(self
            .state
            .borrow()
            .releases
            .iter()
            .find(|r| r.tag == tag)
            .cloned())
    }

    fn list_releases(&self) -> Result<Vec<Release>> {
        Ok(self.releases())
    }

    fn create_release(&self, request: &NewRelease) -> Result<Release> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.create_failures.pop_front() {
            return Err(err);
        }
        if let Some(other) = state.concurrent_create.take() {
            let release = new_release(state.next_id(), &other);
            state.releases.push(release);
        }
        if state.releases.iter().any(|r| r.tag == request.tag) {
            return Err(error::release::hosting_api(422, "already_exists"));
        }
        if let Some(target) = &request.target {
            if !state.commits.contains(target) {
                return Err(error::release::hosting_api(
                    422,
                    "Validation Failed: target_commitish is invalid",
                ));
            }
        }
        let release = new_release(state.next_id(), request);
        state.releases.push(release.clone());
        Ok(release)
    }

    fn update_release_body(&self, release: &Release, body: &str) -> Result<Release> {
        let mut state = self.state.borrow_mut();
        let stored = state
            .releases
            .iter_mut()
            .find(|r| r.id == release.id)
            .ok_or_else(|| error::release::hosting_api(404, "Not Found"))?;
        stored.body = Some(body.to_string());
        Ok(stored.clone())
    }

    fn commit_exists(&self, sha: &str) -> Result<bool> {
        Ok(self.state.borrow().commits.contains(sha))
    }

    fn list_assets(&self, release: &Release) -> Result<Vec<ReleaseAsset>> {
        Ok(self.assets(release.id))
    }

    fn delete_asset(&self, asset: &ReleaseAsset) -> Result<()> {
        for assets in self.state.borrow_mut().assets.values_mut() {
            assets.retain(|(a, _)| a.id != asset.id);
        }
        Ok(())
    }

    fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        label: &str,
        bytes: &[u8],
    ) -> Result<ReleaseAsset> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.upload_failures.pop_front() {
            return Err(err);
        }
        let id = state.next_id();
        let assets = state.assets.entry(release.id).or_default();
        if assets.iter().any(|(a, _)| a.name == name) {
            return Err(error::release::hosting_api(422, "already_exists"));
        }
        let asset = ReleaseAsset {
            id,
            name: name.to_string(),
            label: Some(label.to_string()),
        };
        assets.push((asset.clone(), bytes.to_vec()));
        Ok(asset)
    }
}
