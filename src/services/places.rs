use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    filter::{self, PlaceQuery},
    lifecycle,
    moderation::{self, Page, PageRequest, Transition},
    models::{Place, PlaceFilter, PlaceRequest, PlaceResponse, PlaceUpdateRequest},
    policy::{self, Action},
    repository::RepositoryState,
    validation,
};

/// PlaceService
///
/// Place listing, lookup, submission, editing, deletion and moderation.
#[derive(Clone)]
pub struct PlaceService {
    repo: RepositoryState,
}

impl PlaceService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    async fn respond(&self, place: Place) -> AppResult<PlaceResponse> {
        let stats = self.repo.review_stats(place.id).await?;
        Ok(PlaceResponse::new(place, stats))
    }

    async fn load(&self, id: Uuid) -> AppResult<Place> {
        self.repo
            .find_place(id)
            .await?
            .ok_or_else(|| AppError::not_found("Place", id))
    }

    /// Approved places matching the filter, newest first, each with its review aggregates.
    pub async fn list_places(&self, filter: &PlaceFilter) -> AppResult<Vec<PlaceResponse>> {
        let query = filter::build_public_query(filter)?;
        let places = self.repo.list_places(&query).await?;
        Ok(places
            .into_iter()
            .map(|(place, stats)| PlaceResponse::new(place, stats))
            .collect())
    }

    /// Any place by id, approved or not.
    pub async fn get_place(&self, id: Uuid) -> AppResult<PlaceResponse> {
        let place = self.load(id).await?;
        self.respond(place).await
    }

    pub async fn create_place(
        &self,
        caller: &AuthUser,
        request: PlaceRequest,
    ) -> AppResult<PlaceResponse> {
        validation::place_request(&request)?;
        policy::authorize(caller, Action::CreatePlace)?;

        let place = lifecycle::new_place(request, caller.id);
        self.repo.insert_place(&place).await?;
        tracing::info!(place_id = %place.id, owner = %caller.id, "place submitted for moderation");

        self.respond(place).await
    }

    /// Full replacement of every caller-editable field.
    pub async fn replace_place(
        &self,
        caller: &AuthUser,
        id: Uuid,
        request: PlaceRequest,
    ) -> AppResult<PlaceResponse> {
        validation::place_request(&request)?;
        let mut place = self.load(id).await?;
        policy::authorize(caller, Action::UpdatePlace { owner_id: place.owner_id })?;

        place.name = request.name.trim().to_string();
        place.address = lifecycle::normalize_address(request.address);
        place.lat = request.lat;
        place.lon = request.lon;
        place.wheelchair_accessible = request.wheelchair_accessible;
        place.tactile_elements = request.tactile_elements;
        place.braille_signage = request.braille_signage;
        place.accessible_toilets = request.accessible_toilets;
        place.category = request.category;
        lifecycle::stamp_place_update(&mut place, true);

        self.save(place).await
    }

    /// Partial update: absent fields keep their stored value.
    pub async fn update_place(
        &self,
        caller: &AuthUser,
        id: Uuid,
        request: PlaceUpdateRequest,
    ) -> AppResult<PlaceResponse> {
        validation::place_update(&request)?;
        let mut place = self.load(id).await?;
        policy::authorize(caller, Action::UpdatePlace { owner_id: place.owner_id })?;
        let touches_flags = request.touches_flags();

        if let Some(name) = request.name {
            place.name = name.trim().to_string();
        }
        if request.address.is_some() {
            place.address = lifecycle::normalize_address(request.address);
        }
        if let Some(lat) = request.lat {
            place.lat = lat;
        }
        if let Some(lon) = request.lon {
            place.lon = lon;
        }
        if let Some(value) = request.wheelchair_accessible {
            place.wheelchair_accessible = value;
        }
        if let Some(value) = request.tactile_elements {
            place.tactile_elements = value;
        }
        if let Some(value) = request.braille_signage {
            place.braille_signage = value;
        }
        if let Some(value) = request.accessible_toilets {
            place.accessible_toilets = value;
        }
        if let Some(category) = request.category {
            place.category = category;
        }
        lifecycle::stamp_place_update(&mut place, touches_flags);

        self.save(place).await
    }

    /// Writes a stamped place and answers with the stored row, which may have been
    /// approved since `load`.
    async fn save(&self, place: Place) -> AppResult<PlaceResponse> {
        if !self.repo.update_place(&place).await? {
            return Err(AppError::not_found("Place", place.id));
        }
        tracing::info!(place_id = %place.id, score = place.accessibility_score(), "place updated");
        let stored = self.load(place.id).await?;
        self.respond(stored).await
    }

    pub async fn delete_place(&self, caller: &AuthUser, id: Uuid) -> AppResult<()> {
        let place = self.load(id).await?;
        policy::authorize(caller, Action::DeletePlace { owner_id: place.owner_id })?;

        if !self.repo.delete_place(id).await? {
            return Err(AppError::not_found("Place", id));
        }
        tracing::info!(place_id = %id, caller = %caller.id, "place deleted");
        Ok(())
    }

    /// The moderation queue: unapproved places, oldest first.
    pub async fn list_unapproved(
        &self,
        caller: &AuthUser,
        page: PageRequest,
    ) -> AppResult<Page<PlaceResponse>> {
        policy::authorize(caller, Action::ListUnapprovedPlaces)?;

        let (places, total) = self
            .repo
            .page_places(&PlaceQuery::unapproved(), page)
            .await?;
        let content = places
            .into_iter()
            .map(|(place, stats)| PlaceResponse::new(place, stats))
            .collect();
        Ok(Page::new(content, page, total))
    }

    /// Approves a place. Approving an approved place succeeds without a write.
    pub async fn approve_place(&self, caller: &AuthUser, id: Uuid) -> AppResult<PlaceResponse> {
        policy::authorize(caller, Action::ApprovePlace)?;
        let mut place = self.load(id).await?;

        match moderation::approve(&mut place) {
            Transition::Unchanged => {
                tracing::debug!(place_id = %id, "place already approved");
            }
            Transition::Approved => {
                place.updated_at = lifecycle::next_timestamp(place.updated_at);
                if !self.repo.approve_place(id, place.updated_at).await? {
                    return Err(AppError::not_found("Place", id));
                }
                tracing::info!(place_id = %id, admin = %caller.id, "place approved");
            }
        }
        self.respond(place).await
    }
}
